use morth::runtime::{error, repl};

fn main() -> error::Result<()> {
    repl::run()
}

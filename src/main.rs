use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    localhub::cli::main()
}

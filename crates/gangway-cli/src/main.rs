fn main() {
    if let Err(error) = gangway_cli::run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn main() {
    if let Err(e) = bankbot_engine::cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn main() {
    if let Err(err) = roboflow::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

use colored::Colorize;

fn main() {
    if let Err(err) = limpet::run() {
        eprintln!("{} {}", "✗".bright_red().bold(), err);
        std::process::exit(1);
    }
}

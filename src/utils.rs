use colored::*;

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

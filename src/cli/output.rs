//! CLI output formatting utilities.

use console::style;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a stored source line.
    pub fn source(title: &str, id: &str, channel: Option<&str>, chunks: u32) {
        match channel {
            Some(channel) => println!(
                "  {} {} ({}, {}, {} chunks)",
                style("*").cyan(),
                style(title).bold(),
                style(id).dim(),
                channel,
                chunks
            ),
            None => println!(
                "  {} {} ({}, {} chunks)",
                style("*").cyan(),
                style(title).bold(),
                style(id).dim(),
                chunks
            ),
        }
    }

    /// Print one citation under an answer.
    pub fn citation(index: usize, label: &str, preview: &str, url: Option<&str>) {
        println!(
            "\n{} {}",
            style(format!("[{}]", index)).green(),
            style(label).bold()
        );
        println!("    {}", preview);
        if let Some(url) = url {
            println!("    {}", style(url).dim());
        }
    }
}

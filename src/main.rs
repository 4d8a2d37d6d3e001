use clap::Parser;

use tweetgrab::cli::{self, Cli};
use tweetgrab::ui::form_app;
use tweetgrab::utils::logging::{self, LogTarget};

fn main() {
    let cli = Cli::parse();

    if cli.form {
        // The form owns the terminal, so logs go to a file
        if let Some(log_path) = logging::init(LogTarget::File) {
            eprintln!("Debug logs will be written to:");
            eprintln!("   {}", log_path.display());
        }
        if let Err(e) = form_app::run_form_app() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    } else {
        logging::init(LogTarget::Stderr);
        if let Err(e) = cli::run_search(cli) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

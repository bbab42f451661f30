use std::io::Write;
use std::path::PathBuf;

use gemini_home::agent::{build_system_prompt, Agent};
use gemini_home::config::{Config, DEFAULT_CONFIG_PATH};
use gemini_home::devices::DeviceDirectory;
use gemini_home::gemini::GeminiClient;
use gemini_home::tools::ToolRegistry;
use gemini_home::transcript::Entry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    // Any configuration problem is fatal, each with its own message.
    let config = match Config::load(&path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    println!(
        "Gemini My Home started with {} cameras.",
        config.devices.len()
    );
    println!(
        "You can ask questions about the cameras. For example, you can ask 'What is happening in the living room?'"
    );
    println!("Type 'exit' or 'quit' to terminate the application.");

    let system_prompt = build_system_prompt(&config);
    let client = GeminiClient::new(config.gemini.key.clone(), config.gemini.model.clone());
    let registry = ToolRegistry::new(DeviceDirectory::new(config.devices));
    let mut agent = Agent::new(client, Box::new(registry), system_prompt);

    let stdin = std::io::stdin();
    loop {
        print!(" >>> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            // stdin closed
            break;
        }
        let request = line.trim_end_matches(['\r', '\n']);

        if is_exit_command(request) {
            println!("Exiting Gemini My Home. Goodbye!");
            break;
        }

        let entries = agent.run_turn(request).await?;
        for entry in &entries {
            println!("{}", render_entry(entry));
        }
    }

    Ok(())
}

/// Logs go to stderr so they never interleave with the prompt.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn is_exit_command(input: &str) -> bool {
    let lowered = input.trim().to_lowercase();
    lowered == "exit" || lowered == "quit"
}

/// Console rendering of one transcript entry: user lines echo with the
/// prompt marker, everything else with the reply marker. Images get a
/// placeholder line.
fn render_entry(entry: &Entry) -> String {
    match entry {
        Entry::Text(text) => {
            let prefix = if entry.is_user() { " >>> " } else { " <<< " };
            format!("{prefix}{text}")
        }
        Entry::Image(_) => " <<< SYSTEM: IMAGE SENT BY SYSTEM, NOT A TEXT".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_and_quit_terminate_case_insensitively() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("Quit"));
        assert!(is_exit_command("  quit  "));
    }

    #[test]
    fn ordinary_input_is_not_an_exit_command() {
        assert!(!is_exit_command("what's in the living room?"));
        assert!(!is_exit_command("exit the garage camera"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn user_entries_render_with_prompt_marker() {
        let entry = Entry::Text("USER: hello".to_string());
        assert_eq!(render_entry(&entry), " >>> USER: hello");
    }

    #[test]
    fn system_entries_render_with_reply_marker() {
        let entry = Entry::Text("SYSTEM: nothing unusual.".to_string());
        assert_eq!(render_entry(&entry), " <<< SYSTEM: nothing unusual.");
    }

    #[test]
    fn image_entries_render_as_placeholder() {
        let entry = Entry::Image(vec![0xff, 0xd8]);
        assert_eq!(
            render_entry(&entry),
            " <<< SYSTEM: IMAGE SENT BY SYSTEM, NOT A TEXT"
        );
    }
}

//! PromptCaddy entry point.

use std::io::IsTerminal;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tokio::io::AsyncReadExt;

use promptcaddy::{render, DirectoryWatcher};
use promptcaddy_mcp::cli::{bind_call_args, format_table, load_store};
use promptcaddy_mcp::config::resolve_prompts_dir;
use promptcaddy_mcp::protocol::ProtocolHandler;
use promptcaddy_mcp::tools::ToolRegistry;
use promptcaddy_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "promptcaddy",
    about = "Manage, serve, and execute prompts from Markdown files",
    version
)]
struct Cli {
    /// Directory containing prompt files. Also reads PROMPTCADDY_DIR.
    #[arg(long, global = true)]
    dir: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server over stdio (default).
    Serve,

    /// List all available prompts.
    List,

    /// Render a prompt with the given parameters.
    ///
    /// Parameters are passed as flags named after the prompt's parameters.
    /// Piped stdin is bound to {{selection}}.
    ///
    /// Example:
    ///   git diff | promptcaddy call review --language rust
    Call {
        /// Prompt id.
        id: String,

        /// Parameter flags: --<name> <value> or --<name>=<value>.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Load every prompt file and report the ones that fail.
    Validate,

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let prompts_dir = resolve_prompts_dir(cli.dir.as_deref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let (store, _) = load_store(&prompts_dir)?;
            let store = Arc::new(store);

            tracing::info!("PromptCaddy MCP server");
            tracing::info!("Prompts: {}", prompts_dir.display());

            let watcher = DirectoryWatcher::new(Arc::clone(&store));
            let handler = ProtocolHandler::new(store);
            let mut transport = StdioTransport::new(handler).with_watcher(watcher);
            transport.run().await?;
        }

        Commands::List => {
            let (store, _) = load_store(&prompts_dir)?;
            let prompts = store.list();
            if prompts.is_empty() {
                println!("No prompts found in {}", prompts_dir.display());
            } else {
                print!("{}", format_table(&prompts));
            }
        }

        Commands::Call { id, args } => {
            let (store, _) = load_store(&prompts_dir)?;
            let prompt = store.require(&id)?;

            let selection = if std::io::stdin().is_terminal() {
                None
            } else {
                let mut input = String::new();
                tokio::io::stdin().read_to_string(&mut input).await?;
                Some(input)
            };

            let bindings = bind_call_args(&prompt, &args, selection)?;
            let text = render(&prompt, &bindings)?;
            print!("{text}");
        }

        Commands::Validate => {
            let (_, report) = load_store(&prompts_dir)?;
            println!("Prompt directory: {}", prompts_dir.display());
            println!("  Loaded: {}", report.loaded);
            println!("  Skipped: {}", report.skipped.len());
            for skipped in &report.skipped {
                println!("    {}: {}", skipped.path.display(), skipped.reason);
            }
            if !report.skipped.is_empty() {
                std::process::exit(1);
            }
        }

        Commands::Info => {
            let (store, _) = load_store(&prompts_dir)?;
            let capabilities = promptcaddy_mcp::types::InitializeResult::default_result();
            let mut tools: Vec<String> = ToolRegistry::list_tools(&store)
                .into_iter()
                .map(|t| t.name)
                .collect();
            tools.sort();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "prompts_dir": prompts_dir.display().to_string(),
                "tool_count": tools.len(),
                "tools": tools,
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "promptcaddy", &mut std::io::stdout());
        }
    }

    Ok(())
}

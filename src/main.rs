//! Host entry point: serve the site and contact relay, bundle the wasm front
//! end, or talk to the chatbot from a terminal.

#[cfg(not(target_arch = "wasm32"))]
mod host {
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;
    use std::process::Command;

    use anyhow::{bail, Context};
    use clap::{Parser, Subcommand};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tracing_subscriber::EnvFilter;

    use terrigraphic::chat::{Chatbot, ResponseBook};
    use terrigraphic::config::ServerConfig;
    use terrigraphic::{server, Error};

    #[derive(Parser)]
    #[command(name = "terrigraphic", version, about = "Terrigraphic portfolio site tools")]
    struct Args {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Serve the static site with the contact relay
        Serve {
            /// Port to listen on (overrides PORT)
            #[arg(long)]
            port: Option<u16>,
            /// Directory holding the built site (overrides STATIC_DIR)
            #[arg(long)]
            static_dir: Option<PathBuf>,
        },
        /// Bundle the wasm front end into static/pkg with wasm-pack
        Build {
            /// Output directory for the generated package
            #[arg(long, default_value = "static/pkg")]
            out_dir: PathBuf,
        },
        /// Chat with the assistant in the terminal
        Chat {
            /// JSON response book replacing the built-in replies
            #[arg(long)]
            responses: Option<PathBuf>,
        },
    }

    pub fn run() -> anyhow::Result<()> {
        let args = Args::parse();

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        match args.command {
            Commands::Serve { port, static_dir } => {
                let mut config = ServerConfig::from_env();
                if let Some(port) = port {
                    config.port = port;
                }
                if let Some(dir) = static_dir {
                    config.static_dir = dir;
                }
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(server::serve(config))
            }
            Commands::Build { out_dir } => build(&out_dir),
            Commands::Chat { responses } => chat(responses),
        }
    }

    fn build(out_dir: &std::path::Path) -> anyhow::Result<()> {
        tracing::info!("Building wasm package into {}", out_dir.display());
        let status = Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir"])
            .arg(out_dir)
            .status()
            .context("wasm-pack not found in PATH, install it from https://rustwasm.github.io/wasm-pack/")?;
        if !status.success() {
            bail!("wasm-pack finished with {}", status);
        }
        tracing::info!("wasm package ready; rebuild the host binary to refresh dist/");
        Ok(())
    }

    fn chat(responses: Option<PathBuf>) -> anyhow::Result<()> {
        let book = match responses {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                ResponseBook::from_json(&json)?
            }
            None => ResponseBook::default(),
        };
        let mut bot = Chatbot::new(book, StdRng::from_entropy(), chrono::Utc::now());

        let stdout = io::stdout();
        let mut out = stdout.lock();
        for message in bot.transcript().messages() {
            writeln!(out, "bot> {}", message.text)?;
        }
        for action in bot.quick_actions() {
            writeln!(out, "     try: {}", action)?;
        }

        let stdin = io::stdin();
        loop {
            write!(out, "you> ")?;
            out.flush()?;
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            match bot.send(line.trim_end(), chrono::Utc::now()) {
                Ok(delay) => {
                    writeln!(out, "bot is typing...")?;
                    std::thread::sleep(delay);
                    if let Some(reply) = bot.poll(chrono::Utc::now()) {
                        writeln!(out, "bot> {}", reply.text)?;
                    }
                }
                Err(Error::EmptyMessage) => continue,
                Err(err) => writeln!(out, "({})", err)?,
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    host::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

use anyhow::{Context, Result};
use caption_generator::ai::mime::resolve_image_mime;
use caption_generator::app::App;
use caption_generator::models::{
    clean_keywords, CaptionRequest, CaptionResponse, Config, ErrorResponse,
};
use caption_generator::server::{self, ApiError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "caption-generator")]
#[command(about = "Generate short image captions with Gemini")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Address to bind; overrides HOST.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on; overrides PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Caption one local image and print the JSON result.
    Caption {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        /// Keyword hint; repeat for several.
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caption_generator=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;
    let app = Arc::new(App::new(&config));

    match args.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            let host = host.unwrap_or(config.host.clone());
            let port = port.unwrap_or(config.port);
            info!("Starting caption-generator on {}:{}", host, port);
            server::serve(app, &host, port, config.max_upload_bytes).await?;
            Ok(())
        }
        Command::Caption { image, keywords } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read image {}", image.display()))?;
            let mime_type = resolve_image_mime(None, &bytes);
            let request = CaptionRequest::new(bytes, mime_type, clean_keywords(keywords));

            match app.caption(&request).await {
                Ok(outcome) => {
                    let body = CaptionResponse {
                        legenda: outcome.into_legenda(),
                    };
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    Ok(())
                }
                Err(e) => {
                    let (status, message) = ApiError::from(e).into_parts();
                    let body = ErrorResponse { error: message };
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    error!("Caption failed with status {}", status);
                    std::process::exit(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let args = CliArgs::parse_from(["caption-generator"]);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_caption_subcommand_collects_keywords() {
        let args = CliArgs::parse_from([
            "caption-generator",
            "caption",
            "cat.jpg",
            "-k",
            "gato",
            "--keyword",
            "sofá",
        ]);
        match args.command {
            Some(Command::Caption { image, keywords }) => {
                assert_eq!(image, PathBuf::from("cat.jpg"));
                assert_eq!(keywords, vec!["gato".to_string(), "sofá".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_port_override() {
        let args = CliArgs::parse_from(["caption-generator", "serve", "--port", "8080"]);
        assert!(matches!(
            args.command,
            Some(Command::Serve { port: Some(8080), .. })
        ));
    }
}

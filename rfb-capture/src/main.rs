mod args;

use anyhow::{anyhow, Context, Result};
use args::Args;
use clap::Parser;
use rfb_client::{keysym, protocol_trace, Session};
use rfb_pixelbuffer::convert::to_rgba_image;
use tracing::{debug, info};

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rfb_capture={level},rfb_client={level},rfb_protocol={level},rfb_encodings={level},protocol_trace=info",
                    level = log_level
                )
                .into()
            }),
        )
        .with_target(false)
        .init();
}

async fn drive_input(session: &mut Session, args: &Args) -> Result<()> {
    if let Some((x, y)) = args.click {
        session.move_to(x, y).await?;
        session.click().await?;
        debug!("Clicked at ({}, {})", x, y);
    }

    if let Some(text) = &args.type_text {
        session
            .type_string(text)
            .await
            .with_context(|| format!("Failed to type {:?}", text))?;
    }

    for name in &args.keys {
        let sym = keysym::from_name(name).ok_or_else(|| anyhow!("Unknown key name '{}'", name))?;
        session.press_key(sym).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    if args.trace {
        protocol_trace::set_enabled(true);
    }

    info!("Starting rfb-capture {}", env!("CARGO_PKG_VERSION"));

    let config = args.to_config()?;
    let target = format!("{}:{}", config.connection.host, config.connection.port);
    let mut session = Session::new(config);
    session
        .login()
        .await
        .with_context(|| format!("Login to {} failed", target))?;

    drive_input(&mut session, &args).await?;

    let frames = args.frames.max(1);
    for frame in 1..=frames {
        let buffer = session.capture().await.context("Capture failed")?;
        debug!("Frame {}/{}: {}x{}", frame, frames, buffer.width(), buffer.height());
        if frame < frames {
            tokio::time::sleep(args.interval()).await;
        }
    }

    let pixel_format = *session
        .pixel_format()
        .ok_or_else(|| anyhow!("No pixel format negotiated"))?;
    let buffer = session
        .framebuffer()
        .ok_or_else(|| anyhow!("No framebuffer captured"))?;
    let image = to_rgba_image(buffer, &pixel_format)?;
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(
        "Saved {}x{} screenshot to {}",
        image.width(),
        image.height(),
        args.output.display()
    );

    session.logout();
    Ok(())
}

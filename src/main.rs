mod config;
mod modes;
mod services;
mod session;
mod widgets;
mod word_map;

use clap::Parser;
use gtk::prelude::*;
use gtk::{Application, glib};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::widgets::WordspeakWindow;

const APP_ID: &str = "org.gtk_rs.wordspeak";

/// Read a PDF by ear: select a region, click a word, hear it
#[derive(Parser, Debug)]
#[command(name = "wordspeak", version, about)]
struct Cli {
    /// PDF to open at startup
    pdf: Option<PathBuf>,

    /// Config file (default: <config dir>/wordspeak/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tesseract language for recognition, e.g. "eng" or "deu"
    #[arg(short, long)]
    language: Option<String>,
}

fn load_config(cli: &Cli) -> Config {
    let path = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => path,
        None => return Config::default(),
    };

    let mut config = match Config::load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}; using defaults", e);
            Config::default()
        }
    };

    if let Some(ref language) = cli.language {
        config.ocr.language = language.clone();
    }
    if cli.pdf.is_some() {
        config.document = cli.pdf.clone();
    }
    config
}

fn main() -> glib::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordspeak=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);

    let app = Application::builder().application_id(APP_ID).build();
    app.connect_activate(move |app| {
        if let Some(window) = app.active_window() {
            window.present();
            return;
        }

        let window = WordspeakWindow::new(app, &config);
        if let Some(ref document) = config.document {
            window.open_document(document);
        }
        window.present();
    });

    // Arguments were consumed by clap; GTK must not try to open them as files
    app.run_with_args::<&str>(&[])
}

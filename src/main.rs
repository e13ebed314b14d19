mod app;
mod backlinks;
mod document;
mod gesture;
mod graph;
mod layout;
mod scene;
mod util;
mod viewer;
mod viewport;

use clap::Parser;
use eframe::egui::vec2;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON document with rootId, nodes and optional backlinks.
    #[arg(long, default_value = document::DEFAULT_DATA_PATH)]
    data: String,
    #[arg(long, default_value_t = 1440.0)]
    width: f32,
    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "structure-map",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::StructureMapApp::new(
                cc,
                args.data.clone(),
                vec2(args.width, args.height),
            )))
        }),
    )
}

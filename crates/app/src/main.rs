//! Entry point: parse flags, pick a demo and hand it to the window loop.

mod cli;
mod demos;

use anyhow::Result;
use asset::ObjOptions;
use platform::RunOptions;

use cli::CliArgs;
use demos::{DemoKind, ModelSource};
use demos::cube::CubeDemo;
use demos::orbit::OrbitDemo;
use demos::phong::PhongDemo;
use demos::scene::SceneDemo;
use demos::trajectory::TrajectoryDemo;
use demos::viewer::ViewerDemo;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::from_env();
    log::info!(
        "Starting {:?} demo. Backend: {:?}, show_fps={}, window_size={}x{}",
        args.demo,
        args.backends,
        args.show_fps,
        args.width,
        args.height
    );

    let options = RunOptions {
        backends: args.backends,
        show_fps: args.show_fps,
        width: args.width,
        height: args.height,
    };

    let source = ModelSource {
        obj: args.model,
        mtl: args.mtl,
        overlay: args.overlay,
        options: ObjOptions {
            flip_v: args.flip_v,
            ..ObjOptions::default()
        },
    };

    match args.demo {
        DemoKind::Cube => platform::run(CubeDemo::new(), options)?,
        DemoKind::Viewer => platform::run(ViewerDemo::new(source), options)?,
        DemoKind::Phong => platform::run(PhongDemo::new(source), options)?,
        DemoKind::Orbit => platform::run(OrbitDemo::new(source, args.background), options)?,
        DemoKind::Scene => platform::run(SceneDemo::new(args.scene, args.background), options)?,
        DemoKind::Trajectory => platform::run(
            TrajectoryDemo::new(source, args.trajectory_dir),
            options,
        )?,
    }

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

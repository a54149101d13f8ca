//! Command-line flags: `--name=value` prefixes, last occurrence wins.

use std::path::PathBuf;

use crate::demos::DemoKind;

#[derive(Clone, Debug)]
pub struct CliArgs {
    pub demo: DemoKind,
    pub backends: wgpu::Backends,
    pub show_fps: bool,
    pub width: u32,
    pub height: u32,
    pub model: Option<PathBuf>,
    pub mtl: Option<PathBuf>,
    pub scene: PathBuf,
    pub trajectory_dir: PathBuf,
    pub background: Option<PathBuf>,
    pub overlay: Option<PathBuf>,
    pub flip_v: bool,
}

pub const DEFAULT_SCENE: &str = "scene_init.txt";

impl CliArgs {
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args)
    }

    pub fn parse(args: &[String]) -> Self {
        let (width, height) = parse_size_args(args);
        Self {
            demo: parse_demo_arg(args),
            backends: parse_backend_arg(args),
            show_fps: parse_switch_arg(args, "--show-fps"),
            width,
            height,
            model: last_value(args, "--model=").map(PathBuf::from),
            mtl: last_value(args, "--mtl=").map(PathBuf::from),
            scene: last_value(args, "--scene=")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENE)),
            trajectory_dir: last_value(args, "--trajectory-dir=")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            background: last_value(args, "--background=").map(PathBuf::from),
            overlay: last_value(args, "--overlay=").map(PathBuf::from),
            flip_v: parse_switch_arg(args, "--flip-v"),
        }
    }
}

fn last_value<'a>(args: &'a [String], prefix: &str) -> Option<&'a str> {
    args.iter().rev().find_map(|a| a.strip_prefix(prefix))
}

fn parse_demo_arg(args: &[String]) -> DemoKind {
    match last_value(args, "--demo=") {
        Some(name) => DemoKind::from_name(name).unwrap_or_else(|| {
            log::warn!("Unknown demo '{}', falling back to cube.", name);
            DemoKind::Cube
        }),
        None => DemoKind::Cube,
    }
}

fn parse_backend_arg(args: &[String]) -> wgpu::Backends {
    // Accept: --gpu-backend=auto|vulkan|dx12|metal|gl
    match last_value(args, "--gpu-backend=").map(str::to_ascii_lowercase) {
        None => wgpu::Backends::all(),
        Some(val) => match val.as_str() {
            "auto" => wgpu::Backends::all(),
            "vulkan" | "vk" => wgpu::Backends::VULKAN,
            "dx12" | "d3d12" => wgpu::Backends::DX12,
            "metal" | "mtl" => wgpu::Backends::METAL,
            "gl" | "opengl" | "gles" => wgpu::Backends::GL,
            other => {
                log::warn!("Unknown backend '{}', falling back to auto.", other);
                wgpu::Backends::all()
            }
        },
    }
}

fn parse_switch_arg(args: &[String], flag: &str) -> bool {
    // --flag[=on|off], off by default
    for arg in args.iter().rev() {
        let Some(rest) = arg.strip_prefix(flag) else {
            continue;
        };
        if rest.is_empty() {
            return true;
        }
        if let Some(val) = rest.strip_prefix('=') {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_size_args(args: &[String]) -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(1280).max(1);
    let hh = h.unwrap_or(720).max(1);
    (ww, hh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let cli = CliArgs::parse(&[]);
        assert_eq!(cli.demo, DemoKind::Cube);
        assert_eq!(cli.backends, wgpu::Backends::all());
        assert!(!cli.show_fps);
        assert_eq!((cli.width, cli.height), (1280, 720));
        assert_eq!(cli.scene, PathBuf::from(DEFAULT_SCENE));
        assert!(cli.model.is_none());
        assert!(cli.background.is_none());
        assert!(cli.overlay.is_none());
        assert!(!cli.flip_v);
    }

    #[test]
    fn all_flags() {
        let cli = CliArgs::parse(&args(&[
            "--demo=scene",
            "--gpu-backend=VK",
            "--show-fps=off",
            "--size=800x600",
            "--height=500",
            "--model=a.obj",
            "--mtl=a.mtl",
            "--scene=s.txt",
            "--trajectory-dir=paths",
            "--background=sky.png",
            "--overlay=eye.png",
            "--flip-v=on",
        ]));
        assert_eq!(cli.demo, DemoKind::Scene);
        assert_eq!(cli.backends, wgpu::Backends::VULKAN);
        assert!(!cli.show_fps);
        assert_eq!((cli.width, cli.height), (800, 500));
        assert_eq!(cli.model, Some(PathBuf::from("a.obj")));
        assert_eq!(cli.mtl, Some(PathBuf::from("a.mtl")));
        assert_eq!(cli.scene, PathBuf::from("s.txt"));
        assert_eq!(cli.trajectory_dir, PathBuf::from("paths"));
        assert_eq!(cli.background, Some(PathBuf::from("sky.png")));
        assert_eq!(cli.overlay, Some(PathBuf::from("eye.png")));
        assert!(cli.flip_v);
    }

    #[test]
    fn bad_values_fall_back() {
        let cli = CliArgs::parse(&args(&["--demo=nope", "--gpu-backend=glide", "--size=big", "--width=0"]));
        assert_eq!(cli.demo, DemoKind::Cube);
        assert_eq!(cli.backends, wgpu::Backends::all());
        assert_eq!((cli.width, cli.height), (1, 720));
    }

    #[test]
    fn bare_show_fps_enables() {
        assert!(CliArgs::parse(&args(&["--show-fps"])).show_fps);
    }

    #[test]
    fn switches_take_the_last_occurrence() {
        let cli = CliArgs::parse(&args(&["--flip-v", "--flip-v=off", "--show-fps-ish"]));
        assert!(!cli.flip_v);
        assert!(!cli.show_fps);
    }
}

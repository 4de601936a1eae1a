//! Build script for ffbridge
//!
//! Handles:
//! 1. Compiling the C accessor shim via `cc`
//! 2. Linking the FFmpeg libraries (shared by default, static with the `static` feature)

use std::env;
use std::path::{Path, PathBuf};

/// Libraries the binding exposes, in link order (dependents first)
const FFMPEG_LIBS: [&str; 5] = ["avdevice", "avfilter", "avformat", "avcodec", "avutil"];

/// Extra archives pulled in by libavfilter/libavdevice when linking statically
const STATIC_SUPPORT_LIBS: [&str; 3] = ["postproc", "swscale", "swresample"];

fn main() {
  let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
  let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
  let link_static = env::var_os("CARGO_FEATURE_STATIC").is_some();

  let ffmpeg_dir = get_ffmpeg_dir(&target_os, &target_arch);

  compile_accessors(&ffmpeg_dir);

  if link_static {
    link_static_ffmpeg(&ffmpeg_dir.join("lib"));
    link_platform_libraries(&target_os);
  } else {
    link_shared_ffmpeg(&ffmpeg_dir.join("lib"));
  }

  println!("cargo:rerun-if-changed=src/ffi/accessors.c");
  println!("cargo:rerun-if-changed=build.rs");
  println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
}

/// Get FFmpeg installation directory
fn get_ffmpeg_dir(target_os: &str, target_arch: &str) -> PathBuf {
  if let Ok(dir) = env::var("FFMPEG_DIR") {
    return PathBuf::from(dir);
  }

  #[cfg(unix)]
  {
    if let Ok(output) = std::process::Command::new("pkg-config")
      .args(["--variable=prefix", "libavformat"])
      .output()
    {
      if output.status.success() {
        let prefix = String::from_utf8_lossy(&output.stdout);
        let path = PathBuf::from(prefix.trim());
        if path.exists() {
          return path;
        }
      }
    }
  }

  let common_paths = match target_os {
    "macos" => vec!["/opt/homebrew", "/usr/local", "/opt/local"],
    "linux" => vec!["/usr", "/usr/local", "/opt/ffmpeg"],
    "windows" => vec!["C:\\ffmpeg", "C:\\Program Files\\ffmpeg"],
    _ => vec![],
  };

  for path in common_paths {
    let p = PathBuf::from(path);
    if p.join("include/libavformat/avformat.h").exists() {
      return p;
    }
  }

  // Bundled FFmpeg in the project directory
  let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
  let platform = match (target_os, target_arch) {
    ("macos", "aarch64") => "darwin-arm64",
    ("macos", "x86_64") => "darwin-x64",
    ("linux", "x86_64") => "linux-x64",
    ("linux", "aarch64") => "linux-arm64",
    ("windows", "x86_64") => "win32-x64",
    _ => "unknown",
  };

  let bundled = manifest_dir.join("ffmpeg").join(platform);
  if bundled.exists() {
    return bundled;
  }

  println!(
    "cargo:warning=FFmpeg not found. Set FFMPEG_DIR environment variable or install FFmpeg."
  );
  PathBuf::from("/usr/local")
}

/// Compile the C accessor shim
fn compile_accessors(ffmpeg_dir: &Path) {
  let include_dir = ffmpeg_dir.join("include");

  let mut build = cc::Build::new();
  build
    .file("src/ffi/accessors.c")
    .include(&include_dir)
    .flag_if_supported("-std=c11")
    .flag_if_supported("-Wno-deprecated-declarations")
    .warnings(true);

  // Debian/Ubuntu multiarch layouts keep the headers under /usr/include/<triple>
  if let Ok(triple) = env::var("TARGET") {
    let multiarch = include_dir.join(triple.replace("-unknown", ""));
    if multiarch.exists() {
      build.include(multiarch);
    }
  }

  build.compile("ffmpeg_accessors");
}

/// Link the shared FFmpeg libraries
fn link_shared_ffmpeg(lib_dir: &Path) {
  if lib_dir.exists() {
    println!("cargo:rustc-link-search=native={}", lib_dir.display());
  }

  for lib in FFMPEG_LIBS {
    println!("cargo:rustc-link-lib=dylib={}", lib);
  }
}

/// Link FFmpeg statically using full paths to .a files
fn link_static_ffmpeg(lib_dir: &Path) {
  for lib in FFMPEG_LIBS {
    let static_lib = lib_dir.join(format!("lib{}.a", lib));
    if static_lib.exists() {
      println!("cargo:rustc-link-arg={}", static_lib.display());
    } else {
      panic!(
        "Static library lib{}.a not found at {}. \
         Build with default features for shared linking, \
         or set FFMPEG_DIR to an FFmpeg installation with static libs.",
        lib,
        lib_dir.display()
      );
    }
  }

  // Optional support archives, silently skipped when FFmpeg was configured without them
  for lib in STATIC_SUPPORT_LIBS {
    let static_lib = lib_dir.join(format!("lib{}.a", lib));
    if static_lib.exists() {
      println!("cargo:rustc-link-arg={}", static_lib.display());
    }
  }
}

/// Link platform-specific system libraries needed by static FFmpeg
fn link_platform_libraries(target_os: &str) {
  match target_os {
    "macos" => {
      let frameworks = [
        "CoreFoundation",
        "CoreMedia",
        "CoreVideo",
        "AudioToolbox",
        "VideoToolbox",
        "Security",
      ];

      for framework in &frameworks {
        println!("cargo:rustc-link-lib=framework={}", framework);
      }

      println!("cargo:rustc-link-lib=bz2");
      println!("cargo:rustc-link-lib=iconv");
      println!("cargo:rustc-link-lib=lzma");
    }

    "linux" => {
      println!("cargo:rustc-link-lib=m");
      println!("cargo:rustc-link-lib=pthread");
      println!("cargo:rustc-link-lib=dl");
    }

    "windows" => {
      let libs = [
        "bcrypt", "ole32", "oleaut32", "user32", "ws2_32", "secur32", "advapi32",
      ];

      for lib in &libs {
        println!("cargo:rustc-link-lib={}", lib);
      }
    }

    _ => {
      println!("cargo:warning=Unknown target OS: {}", target_os);
    }
  }
}

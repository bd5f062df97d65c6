//! Builds the Verilator shim when the `verilator` feature is enabled.

use std::{
    ffi::OsStr,
    iter,
    path::{Path, PathBuf},
    process,
};

static DEP_FILES: &[&str] = &[
    "dma_verilated.cpp",
    "dma_verilated.h",
    "Makefile",
    "rtl/DmaSM4SGTop.v",
];

fn cmd_args(cmd: &process::Command) -> Vec<&OsStr> {
    iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .collect()
}

fn run_command(cmd: &mut process::Command) {
    match cmd.status() {
        Err(err) => {
            eprintln!("Command {:?} failed: {err}", cmd_args(cmd));
            process::exit(1);
        }
        Ok(status) => {
            if !status.success() {
                eprintln!("Command {:?} exit code {:?}", cmd_args(cmd), status.code());
                eprintln!("Please ensure that verilator 5.004 or later is installed");
                process::exit(1);
            }
        }
    }
}

fn rerun_if_changed(manifest_dir: &Path) {
    for p in DEP_FILES {
        println!("cargo:rerun-if-changed={}", manifest_dir.join(p).display());
    }
}

fn main() {
    if std::env::var_os("CARGO_FEATURE_VERILATOR").is_none() {
        return;
    }
    let Some(manifest_dir) = std::env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from) else {
        eprintln!("CARGO_MANIFEST_DIR is not set");
        process::exit(1);
    };
    if !manifest_dir.join("rtl/DmaSM4SGTop.v").exists() {
        eprintln!("rtl/DmaSM4SGTop.v is missing; copy the generated controller RTL there");
        process::exit(1);
    }

    let mut make_cmd = process::Command::new("make");
    make_cmd.current_dir(&manifest_dir);
    run_command(&mut make_cmd);

    rerun_if_changed(&manifest_dir);
    println!("cargo:rustc-link-search={}/out", manifest_dir.display());
    println!("cargo:rustc-link-lib=static=dma_verilated");
    println!("cargo:rustc-link-lib=static=dma_top");
    println!("cargo:rustc-link-lib=static=verilated");
    println!("cargo:rustc-link-lib=dylib=stdc++");
}

// Copies the page shell in static/ to dist/ so the relay can serve a
// self-contained site. The wasm bundle itself comes from `terrigraphic build`.
use std::io;
use std::{fs, path::Path};

fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if path.is_dir() {
            copy_dir(&path, &dst_path)?;
        } else {
            fs::copy(&path, &dst_path)?;
        }
    }
    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed=static");

    let static_dir = Path::new("static");
    if !static_dir.exists() {
        return;
    }

    let out_dir = Path::new("dist");
    if out_dir.exists() {
        if let Err(err) = fs::remove_dir_all(out_dir) {
            println!("cargo:warning=could not clear dist/: {err}");
        }
    }
    if let Err(err) = copy_dir(static_dir, out_dir) {
        println!("cargo:warning=copying static/ to dist/ failed: {err}");
    }
}

use std::env;
use std::fs;
use std::path;

fn main() -> Result<(), failure::Error> {
    use std::io::Write;

    let out_dir_str = env::var_os("OUT_DIR").ok_or_else(|| failure::err_msg("OUT_DIR is not set"))?;
    let out_dir_path = path::Path::new(&out_dir_str);

    let integration_test_ok_path = out_dir_path.join("integration_test_ok.rs");
    let mut integration_test_ok_file = fs::File::create(integration_test_ok_path)?;
    println!("cargo:rerun-if-changed=testdata/ok");
    for path in fixtures("testdata/ok")? {
        let name = test_name(&path);
        let out_path = path.with_extension("out.txt");
        writeln!(
            integration_test_ok_file,
            "integration_test_ok!(ok_{}, {:?}, {:?});",
            name, path, out_path
        )?;
    }

    let integration_test_err_path = out_dir_path.join("integration_test_err.rs");
    let mut integration_test_err_file = fs::File::create(integration_test_err_path)?;
    println!("cargo:rerun-if-changed=testdata/err");
    for path in fixtures("testdata/err")? {
        let name = test_name(&path);
        let err_path = path.with_extension("err.txt");
        writeln!(
            integration_test_err_file,
            "integration_test_err!(err_{}, {:?}, {:?});",
            name, path, err_path
        )?;
    }

    Ok(())
}

fn fixtures(dir: &str) -> Result<Vec<path::PathBuf>, failure::Error> {
    let mut paths = Vec::new();
    for dir_entry in fs::read_dir(dir)? {
        let path = dir_entry?.path();
        println!("cargo:rerun-if-changed={}", path.to_string_lossy());
        if path.extension().map_or(false, |e| e == "ls") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn test_name(path: &path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace('-', "_"))
        .unwrap_or_default()
}

use std::env;

fn main() {
    if env::var_os("CARGO_FEATURE_FFI").is_some() {
        println!("cargo:info=FFI feature enabled, looking for the impulse shim library...");

        if let Ok(lib_dir) = env::var("EI_HARNESS_LIB_DIR") {
            println!("cargo:info=Found shim library directory: {lib_dir}");
            println!("cargo:rustc-link-search=native={lib_dir}");
            println!("cargo:rustc-link-lib=static=ei_harness");

            // The SDK is C++; the shim needs the C++ runtime at link time
            let cxx = env::var("EI_HARNESS_CXX_LIB").unwrap_or_else(|_| "stdc++".to_string());
            if !cxx.is_empty() {
                println!("cargo:rustc-link-lib=dylib={cxx}");
            }
        } else {
            println!("cargo:warning=EI_HARNESS_LIB_DIR is not set, the ffi engine will fail to link.");
            println!("cargo:warning=Build the impulse shim as libei_harness.a and point EI_HARNESS_LIB_DIR at it.");
        }
    } else {
        println!("cargo:info=FFI feature not enabled");
    }
    println!("cargo:rerun-if-env-changed=EI_HARNESS_LIB_DIR");
    println!("cargo:rerun-if-env-changed=EI_HARNESS_CXX_LIB");
    println!("cargo:rerun-if-changed=build.rs");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // ESP-IDF toolchain environment is only needed for on-target builds.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

fn main() {
    // ESP-IDF sysenv directives only apply to device builds; host builds
    // (tests) must not inherit a stale IDF environment.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}

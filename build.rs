fn main() {
    // ESP-IDF link arguments are only needed for the device build; host
    // builds use the simulation adapters and need nothing from here.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

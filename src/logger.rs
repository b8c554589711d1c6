#[ctor::ctor]
fn init() {
    if let Err(error) = log4rs::init_file("log4rs.yaml", Default::default()) {
        eprintln!("Logging disabled, log4rs.yaml could not be loaded: {}", error);
    }
}

pub fn log_block(name: &str, content: &[u8]) {
    fn get_byte_array(bytes: &[u8]) -> Vec<String> {
        bytes.iter().map(|byte| format!("{:02X}", byte)).collect()
    }
    log::debug!("{} ({} bytes)\n{:?}", name, content.len(), get_byte_array(content));
}

use catalog_loader::EtlError;

fn main() {
    if let Err(err) = catalog_loader::run() {
        if let Some(EtlError::SourceNotFound { .. }) = err.downcast_ref::<EtlError>() {
            eprintln!("error: CSV file not found. Please check the file path.");
            eprintln!("  caused by: {err:#}");
            std::process::exit(2);
        }
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

use super::{StreamSource, expand_home};
use std::fs::File;
use std::io::{self, Read};

/// Opens archives stored on the local filesystem
///
/// Locations are resolved the way [`DiskPath`](super::DiskPath) resolves
/// them, so a leading `~` refers to the home directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSource;

impl StreamSource for LocalFileSource {
    fn open(&self, location: &str) -> io::Result<Box<dyn Read + Send>> {
        let path = expand_home(location);
        log::trace!("opening archive stream {}", path.display());
        let file = File::open(&path)?;
        Ok(Box::new(file))
    }
}

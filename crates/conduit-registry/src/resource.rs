use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

pub const BLOCKS_RESOURCE: &str = "mappings/blocks.json";
pub const INTERACTIONS_RESOURCE: &str = "mappings/interactions.json";

/// Resource name of the Bedrock block palette for one version tag.
pub fn block_palette_resource(palette_tag: &str) -> String {
    format!("bedrock/block_palette.{}.nbt", palette_tag)
}

/// Byte-stream-by-name source for the static mapping documents shipped with
/// the build.
pub trait ResourceProvider {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read>>;
}

/// Serves resources from a directory tree on disk.
pub struct DirResourceProvider {
    root: PathBuf,
}

impl DirResourceProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirResourceProvider { root: root.into() }
    }
}

impl ResourceProvider for DirResourceProvider {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read>> {
        let file = File::open(self.root.join(name))?;
        Ok(Box::new(file))
    }
}

/// Serves resources from memory; used by tests to feed synthesized documents
/// into the compiler.
#[derive(Default)]
pub struct MemoryResourceProvider {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.resources.insert(name.into(), bytes);
    }
}

impl ResourceProvider for MemoryResourceProvider {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read>> {
        match self.resources.get(name) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such resource: {}", name),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_palette_resource_name() {
        assert_eq!(
            block_palette_resource("1_19_80"),
            "bedrock/block_palette.1_19_80.nbt"
        );
    }

    #[test]
    fn test_dir_provider_reads_relative_names() {
        let root = std::env::temp_dir().join(format!(
            "conduit-resource-test-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(root.join("mappings")).unwrap();
        std::fs::write(root.join(BLOCKS_RESOURCE), b"{}").unwrap();

        let provider = DirResourceProvider::new(&root);
        let mut contents = String::new();
        provider
            .open(BLOCKS_RESOURCE)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "{}");

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_memory_provider_roundtrip() {
        let mut provider = MemoryResourceProvider::new();
        provider.insert("mappings/blocks.json", b"{}".to_vec());

        let mut contents = String::new();
        provider
            .open("mappings/blocks.json")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "{}");

        assert!(provider.open("missing").is_err());
    }
}

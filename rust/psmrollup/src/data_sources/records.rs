use crate::errors::InputReadingError;
use serde::de::DeserializeOwned;
use std::io::{
    BufRead,
    BufReader,
    Read,
};
use std::marker::PhantomData;
use std::path::{
    Path,
    PathBuf,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    NdJson,
    NdJsonZstd,
    MessagePack,
    MessagePackZstd,
}

impl RecordFormat {
    pub fn detect_from_path(path: &Path) -> Result<Self, InputReadingError> {
        let path_str = path.to_string_lossy().to_lowercase();

        if path_str.ends_with(".msgpack.zst") {
            Ok(RecordFormat::MessagePackZstd)
        } else if path_str.ends_with(".msgpack") {
            Ok(RecordFormat::MessagePack)
        } else if path_str.ends_with(".ndjson.zst") {
            Ok(RecordFormat::NdJsonZstd)
        } else if path_str.ends_with(".ndjson") {
            Ok(RecordFormat::NdJson)
        } else if path_str.ends_with(".json") {
            Ok(RecordFormat::Json)
        } else {
            // Try to detect by reading first few bytes
            Self::detect_from_content(path)
        }
    }

    fn detect_from_content(path: &Path) -> Result<Self, InputReadingError> {
        let file =
            std::fs::File::open(path).map_err(|e| InputReadingError::FileReadingError {
                source: e,
                context: "Error opening file for format detection",
                path: PathBuf::from(path),
            })?;

        let mut reader = BufReader::new(file);
        let mut buffer = [0u8; 8];

        match reader.read(&mut buffer) {
            Ok(bytes_read) if bytes_read >= 4 => {
                if buffer[0..4] == [0x28, 0xB5, 0x2F, 0xFD] {
                    Ok(RecordFormat::MessagePackZstd)
                } else if buffer[0] == b'[' {
                    Ok(RecordFormat::Json)
                } else if buffer[0] == b'{' {
                    Ok(RecordFormat::NdJson)
                } else {
                    Ok(RecordFormat::MessagePack)
                }
            }
            _ => Ok(RecordFormat::NdJson),
        }
    }
}

/// Streams records of type `T` out of any of the supported [`RecordFormat`]s.
pub struct RecordReader<'a, T> {
    inner: Box<dyn Iterator<Item = Result<T, InputReadingError>> + Send + 'a>,
}

impl<'a, T: DeserializeOwned + Send + 'a> RecordReader<'a, T> {
    pub fn new<R: Read + Send + 'a>(
        reader: R,
        format: RecordFormat,
    ) -> Result<Self, InputReadingError> {
        let inner: Box<dyn Iterator<Item = Result<T, InputReadingError>> + Send> = match format {
            RecordFormat::Json => {
                let elems: Vec<T> = serde_json::from_reader(BufReader::new(reader)).map_err(
                    |e| InputReadingError::ParsingError {
                        source: e,
                        context: "Error parsing JSON array",
                    },
                )?;
                Box::new(elems.into_iter().map(Ok))
            }
            RecordFormat::NdJson => Box::new(NdJsonReader::new(BufReader::new(reader))),
            RecordFormat::NdJsonZstd => {
                let decoder = zstd::Decoder::new(reader).map_err(zstd_error)?;
                Box::new(NdJsonReader::new(BufReader::new(decoder)))
            }
            RecordFormat::MessagePack => Box::new(MessagePackReader::new(reader)),
            RecordFormat::MessagePackZstd => {
                let decoder = zstd::Decoder::new(reader).map_err(zstd_error)?;
                Box::new(MessagePackReader::new(decoder))
            }
        };

        Ok(RecordReader { inner })
    }
}

fn zstd_error(e: std::io::Error) -> InputReadingError {
    InputReadingError::ParsingError {
        source: serde_json::Error::io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        context: "Error creating ZSTD decoder",
    }
}

impl<T> Iterator for RecordReader<'_, T> {
    type Item = Result<T, InputReadingError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

struct NdJsonReader<R: BufRead, T> {
    reader: R,
    _marker: PhantomData<fn() -> T>,
}

impl<R: BufRead, T> NdJsonReader<R, T> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            _marker: PhantomData,
        }
    }
}

impl<R: BufRead, T: DeserializeOwned> Iterator for NdJsonReader<R, T> {
    type Item = Result<T, InputReadingError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None, // EOF
                Ok(_) => {
                    if line.trim().is_empty() {
                        continue; // Skip empty lines
                    }
                    return Some(serde_json::from_str(&line).map_err(|e| {
                        InputReadingError::ParsingError {
                            source: e,
                            context: "Error parsing NDJSON line",
                        }
                    }));
                }
                Err(e) => {
                    return Some(Err(InputReadingError::FileReadingError {
                        source: e,
                        context: "Error reading line",
                        path: PathBuf::new(),
                    }));
                }
            }
        }
    }
}

struct MessagePackReader<R: Read, T> {
    deserializer: rmp_serde::Deserializer<rmp_serde::decode::ReadReader<R>>,
    _marker: PhantomData<fn() -> T>,
}

impl<R: Read, T> MessagePackReader<R, T> {
    fn new(reader: R) -> Self {
        Self {
            deserializer: rmp_serde::Deserializer::new(reader),
            _marker: PhantomData,
        }
    }
}

impl<R: Read, T: DeserializeOwned> Iterator for MessagePackReader<R, T> {
    type Item = Result<T, InputReadingError>;

    fn next(&mut self) -> Option<Self::Item> {
        match T::deserialize(&mut self.deserializer) {
            Ok(elem) => Some(Ok(elem)),
            Err(rmp_serde::decode::Error::InvalidMarkerRead(ref io_err))
                if io_err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                None
            } // EOF
            Err(rmp_serde::decode::Error::InvalidDataRead(ref io_err))
                if io_err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                None
            } // EOF
            Err(e) => Some(Err(InputReadingError::ParsingError {
                source: serde_json::Error::io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    e,
                )),
                context: "Error reading MessagePack",
            })),
        }
    }
}

/// Reads every record in `path`, detecting the format from its extension.
pub fn read_records<T: DeserializeOwned + Send>(path: &Path) -> Result<Vec<T>, InputReadingError> {
    let format = RecordFormat::detect_from_path(path)?;
    read_records_with_format(path, format)
}

pub fn read_records_with_format<T: DeserializeOwned + Send>(
    path: &Path,
    format: RecordFormat,
) -> Result<Vec<T>, InputReadingError> {
    let file = std::fs::File::open(path).map_err(|e| InputReadingError::FileReadingError {
        source: e,
        context: "Error opening input file",
        path: PathBuf::from(path),
    })?;

    let reader = RecordReader::new(file, format)?;
    reader.collect()
}

use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::streams::arff::parser::{is_comment_or_empty, parse_header, parse_instance_values};
use crate::streams::stream::Stream;
use std::fs::File;
use std::io::{BufRead, BufReader, Error, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Streams the rows of an ARFF file as dense instances.
///
/// Rows that do not match the header are reported on stderr and skipped.
#[derive(Debug)]
pub struct ArffFileStream {
    path: PathBuf,
    reader: BufReader<File>,
    header: Arc<InstanceHeader>,
    data_start_pos: u64,
    next_line: Option<String>,
    finished: bool,
}

impl ArffFileStream {
    /// Opens `path` and parses its header. `class_index` defaults to the last
    /// attribute.
    pub fn new(path: PathBuf, class_index: Option<usize>) -> Result<Self, Error> {
        let mut reader = BufReader::new(File::open(&path)?);
        let (header, data_start_pos) = parse_header(&mut reader, class_index)?;

        let mut stream = ArffFileStream {
            path,
            reader,
            header: Arc::new(header),
            data_start_pos,
            next_line: None,
            finished: false,
        };
        stream.fill_next_line()?;
        Ok(stream)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fill_next_line(&mut self) -> Result<(), Error> {
        self.next_line = None;
        if self.finished {
            return Ok(());
        }
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                self.finished = true;
                return Ok(());
            }
            if !is_comment_or_empty(&line) {
                self.next_line = Some(line.trim().to_string());
                return Ok(());
            }
        }
    }
}

impl Stream for ArffFileStream {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        !self.finished || self.next_line.is_some()
    }

    fn next_instance(&mut self) -> Option<Box<dyn Instance>> {
        loop {
            let line = self.next_line.take()?;
            if self.fill_next_line().is_err() {
                self.finished = true;
                self.next_line = None;
            }

            match parse_instance_values(&self.header, &line) {
                Ok(values) => {
                    let instance = DenseInstance::new(Arc::clone(&self.header), values, 1.0);
                    return Some(Box::new(instance));
                }
                Err(e) => eprintln!("Invalid data found in line '{line}': {e}"),
            }
        }
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.reader = BufReader::new(File::open(&self.path)?);
        self.reader.seek(SeekFrom::Start(self.data_start_pos))?;
        self.finished = false;
        self.fill_next_line()
    }
}

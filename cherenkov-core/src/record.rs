//! Tokenizer for the tagged-record event stream
//!
//! The stream is whitespace-delimited text. Each record starts with a tag
//! token followed by a fixed number of numeric fields:
//!
//! ```text
//! ID       <filler> <hit#> <x> <y> <z> <dx> <dy> <dz> <charge> <time>
//! OD       <filler> <hit#> <x> <y> <z> <dx> <dy> <dz> <charge> <time>
//! TIME     <t>
//! VERTEX   <x> <y> <z>
//! PARTICLE <type_code> <dx> <dy> <dz> <momentum> <id>
//! NEXTEVENT
//! ```
//!
//! Records may span line breaks. Tokens that are not a known tag are skipped
//! one at a time.

use glam::DVec3;
use std::collections::VecDeque;
use std::io::BufRead;
use thiserror::Error;

/// Why the reader stopped producing records
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("end of stream")]
    EndOfStream,
    #[error("line {line}: {tag} field '{field}' is not a finite number: '{token}'")]
    Malformed {
        line: usize,
        tag: &'static str,
        field: &'static str,
        token: String,
    },
    #[error("line {line}: stream ended inside {tag} record (missing '{field}')")]
    Truncated {
        line: usize,
        tag: &'static str,
        field: &'static str,
    },
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// True for the ordinary "no more input" signal
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadError::EndOfStream)
    }

    /// True when the input itself is bad (as opposed to exhausted or unreadable)
    pub fn is_malformed(&self) -> bool {
        matches!(self, ReadError::Malformed { .. } | ReadError::Truncated { .. })
    }

    /// 1-based source line, when the error points at one
    pub fn line(&self) -> Option<usize> {
        match self {
            ReadError::Malformed { line, .. } | ReadError::Truncated { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Fields shared by `ID` and `OD` records
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub filler: f64,
    pub sequence_number: i64,
    pub position: DVec3,
    pub direction: DVec3,
    pub charge: f64,
    pub time: f64,
}

/// Fields of a `PARTICLE` record
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRecord {
    pub type_code: i32,
    pub direction: DVec3,
    pub momentum: f64,
    pub track_id: i64,
}

/// One decoded record
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    InnerHit(HitRecord),
    OuterHit(HitRecord),
    Time(f64),
    Vertex(DVec3),
    Particle(ParticleRecord),
    NextEvent,
}

impl Record {
    pub fn tag(&self) -> &'static str {
        match self {
            Record::InnerHit(_) => "ID",
            Record::OuterHit(_) => "OD",
            Record::Time(_) => "TIME",
            Record::Vertex(_) => "VERTEX",
            Record::Particle(_) => "PARTICLE",
            Record::NextEvent => "NEXTEVENT",
        }
    }
}

/// Reads [`Record`]s from a buffered text stream
pub struct RecordReader<R> {
    input: R,
    line: usize,
    pending: VecDeque<(usize, String)>,
    skipped_tokens: usize,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: 0,
            pending: VecDeque::new(),
            skipped_tokens: 0,
        }
    }

    /// Number of unrecognized tokens skipped so far
    pub fn skipped_tokens(&self) -> usize {
        self.skipped_tokens
    }

    /// Decode the next record
    ///
    /// Returns [`ReadError::EndOfStream`] once the input is exhausted between
    /// records.
    pub fn next_record(&mut self) -> Result<Record, ReadError> {
        loop {
            let Some((line, tag)) = self.next_token()? else {
                return Err(ReadError::EndOfStream);
            };
            let record = match tag.as_str() {
                "ID" => Record::InnerHit(self.hit_fields("ID")?),
                "OD" => Record::OuterHit(self.hit_fields("OD")?),
                "TIME" => Record::Time(self.float("TIME", "t")?),
                "VERTEX" => Record::Vertex(self.vector("VERTEX", ["x", "y", "z"])?),
                "PARTICLE" => Record::Particle(self.particle_fields()?),
                "NEXTEVENT" => Record::NextEvent,
                other => {
                    log::debug!("line {line}: skipping unknown token '{other}'");
                    self.skipped_tokens += 1;
                    continue;
                }
            };
            return Ok(record);
        }
    }

    fn hit_fields(&mut self, tag: &'static str) -> Result<HitRecord, ReadError> {
        let filler = self.float(tag, "filler")?;
        let sequence_number = self.integer(tag, "hit#")?;
        let position = self.vector(tag, ["x", "y", "z"])?;
        let direction = self.vector(tag, ["dx", "dy", "dz"])?;
        let charge = self.float(tag, "charge")?;
        let time = self.float(tag, "time")?;
        Ok(HitRecord {
            filler,
            sequence_number,
            position,
            direction,
            charge,
            time,
        })
    }

    fn particle_fields(&mut self) -> Result<ParticleRecord, ReadError> {
        const TAG: &str = "PARTICLE";
        let type_code = self.integer(TAG, "type_code")?;
        let direction = self.vector(TAG, ["dx", "dy", "dz"])?;
        let momentum = self.float(TAG, "momentum")?;
        let track_id = self.integer(TAG, "id")?;
        let type_code = i32::try_from(type_code).map_err(|_| ReadError::Malformed {
            line: self.line,
            tag: TAG,
            field: "type_code",
            token: type_code.to_string(),
        })?;
        Ok(ParticleRecord {
            type_code,
            direction,
            momentum,
            track_id,
        })
    }

    fn vector(&mut self, tag: &'static str, fields: [&'static str; 3]) -> Result<DVec3, ReadError> {
        let x = self.float(tag, fields[0])?;
        let y = self.float(tag, fields[1])?;
        let z = self.float(tag, fields[2])?;
        Ok(DVec3::new(x, y, z))
    }

    fn float(&mut self, tag: &'static str, field: &'static str) -> Result<f64, ReadError> {
        let (line, token) = self.field_token(tag, field)?;
        // `nan` and `inf` parse as f64 but are not usable field values
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ReadError::Malformed {
                line,
                tag,
                field,
                token,
            }),
        }
    }

    /// Integers may be written with a zero fraction (`11.0`)
    fn integer(&mut self, tag: &'static str, field: &'static str) -> Result<i64, ReadError> {
        let (line, token) = self.field_token(tag, field)?;
        parse_integer(&token).ok_or(ReadError::Malformed {
            line,
            tag,
            field,
            token,
        })
    }

    fn field_token(
        &mut self,
        tag: &'static str,
        field: &'static str,
    ) -> Result<(usize, String), ReadError> {
        self.next_token()?.ok_or(ReadError::Truncated {
            line: self.line,
            tag,
            field,
        })
    }

    fn next_token(&mut self) -> Result<Option<(usize, String)>, ReadError> {
        while self.pending.is_empty() {
            let mut buf = String::new();
            if self.input.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let line = self.line;
            self.pending
                .extend(buf.split_whitespace().map(|tok| (line, tok.to_string())));
        }
        Ok(self.pending.pop_front())
    }
}

fn parse_integer(token: &str) -> Option<i64> {
    if let Ok(value) = token.parse::<i64>() {
        return Some(value);
    }
    let value = token.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

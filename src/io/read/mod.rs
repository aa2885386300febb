// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to load sources and visibilities, either synthetically or from flat
//! files.
//!
//! Flat files start with a line containing a record count, followed by that
//! many whitespace-delimited records (one per line). Blank lines are skipped.

mod error;

pub use error::ReadError;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, info, trace};

use crate::{
    config::Config,
    data::{ComplexSample, Source, Visibility, VisibilitySet},
    random::DftRng,
};

/// Load sources according to `config`. When reading from a file,
/// `config.num_sources` is overwritten by the file's count.
///
/// Synthetic sources are drawn uniformly over the grid and have unit
/// intensity. File source positions are given in grid cells and are scaled
/// by the cell size.
pub fn load_sources(config: &mut Config, rng: &mut DftRng) -> Result<Vec<Source>, ReadError> {
    if config.synthetic_sources {
        if config.enable_messages {
            info!("Using synthetic sources");
        }
        let mut sources = allocate(config.num_sources, "sources")?;
        for _ in 0..config.num_sources {
            sources.push(Source {
                l: rng.uniform(config.min_u(), config.max_u()) * config.cell_size(),
                m: rng.uniform(config.min_v(), config.max_v()) * config.cell_size(),
                intensity: 1.0,
            });
        }
        if config.enable_messages {
            info!("Successfully loaded {} synthetic sources", sources.len());
        }
        return Ok(sources);
    }

    if config.enable_messages {
        info!("Using sources from {}", config.source_file.display());
    }
    let mut reader = RecordReader::open(&config.source_file)?;
    let count = reader.count()?;
    config.num_sources = count;

    let mut sources = allocate(count, "sources")?;
    for i in 0..count {
        let [l, m, intensity] = reader
            .record::<3>()?
            .ok_or_else(|| reader.truncated(count, i))?;
        sources.push(Source {
            l: l * config.cell_size(),
            m: m * config.cell_size(),
            intensity,
        });
    }
    if config.enable_messages {
        info!("Successfully loaded {} sources from file", sources.len());
    }
    Ok(sources)
}

/// Load visibilities according to `config`, alongside zeroed samples. When
/// reading from a file, `config.num_visibilities` is overwritten by the file's
/// count.
///
/// File coordinates are in wavelengths and are multiplied by
/// [`Config::wavelength_to_metres`]. The brightness and intensity columns are
/// parsed but discarded. Synthetic coordinates are divided by
/// [`Config::uv_scale`].
pub fn load_visibilities(
    config: &mut Config,
    rng: &mut DftRng,
) -> Result<VisibilitySet, ReadError> {
    let visibilities = if config.synthetic_visibilities {
        if config.enable_messages {
            info!("Using synthetic visibilities");
        }
        let mut visibilities = allocate(config.num_visibilities, "visibilities")?;
        let (mut g_u, mut g_v) = (1.0, 1.0);
        for _ in 0..config.num_visibilities {
            if config.gaussian_distribution_sources {
                g_v = rng.gaussian();
                g_u = rng.gaussian();
            }
            let u = rng.uniform(config.min_u(), config.max_u()) * g_u;
            let v = rng.uniform(config.min_v(), config.max_v()) * g_v;
            // w shares v's scaling factor.
            let w = rng.uniform(config.min_v() / 10.0, config.max_v() / 10.0) * g_v;
            visibilities.push(Visibility {
                u: u / config.uv_scale(),
                v: v / config.uv_scale(),
                w: w / config.uv_scale(),
            });
        }
        if config.enable_messages {
            info!("Total vis: {}", visibilities.len());
        }
        visibilities
    } else {
        if config.enable_messages {
            info!("Using visibilities from {}", config.vis_src_file.display());
        }
        let mut reader = RecordReader::open(&config.vis_src_file)?;
        let count = reader.count()?;
        config.num_visibilities = count;

        let scale = config.wavelength_to_metres();
        debug!("Scaling file uvw by {scale}");
        let mut visibilities = allocate(count, "visibilities")?;
        for i in 0..count {
            let [u, v, w, _real, _imag, _intensity] = reader
                .record::<6>()?
                .ok_or_else(|| reader.truncated(count, i))?;
            visibilities.push(Visibility {
                u: u * scale,
                v: v * scale,
                w: if config.force_zero_w_term {
                    0.0
                } else {
                    w * scale
                },
            });
        }
        if config.enable_messages {
            info!(
                "Successfully loaded {} visibilities from file",
                visibilities.len()
            );
        }
        visibilities
    };

    let mut samples = allocate(visibilities.len(), "complex samples")?;
    samples.resize(visibilities.len(), ComplexSample::default());
    Ok(VisibilitySet::new(visibilities, samples))
}

/// Get an empty vector that can hold `count` elements without reallocating,
/// or an error if the memory isn't available.
fn allocate<T>(count: usize, what: &'static str) -> Result<Vec<T>, ReadError> {
    let mut v = Vec::new();
    v.try_reserve_exact(count)
        .map_err(|_| ReadError::Allocation { count, what })?;
    Ok(v)
}

/// Reads a count line followed by fixed-width records of floats.
pub(crate) struct RecordReader<R: BufRead> {
    buf: R,
    file: String,
    line: String,
    line_num: usize,
}

impl RecordReader<BufReader<File>> {
    pub(crate) fn open(file: &Path) -> Result<Self, ReadError> {
        trace!("Opening {}", file.display());
        let f = File::open(file).map_err(|err| ReadError::OpenFile {
            file: file.display().to_string(),
            err,
        })?;
        Ok(RecordReader::new(BufReader::new(f), file.display().to_string()))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub(crate) fn new(buf: R, file: String) -> Self {
        RecordReader {
            buf,
            file,
            line: String::new(),
            line_num: 0,
        }
    }

    /// Advance to the next non-blank line. Returns `false` at the end of the
    /// file.
    fn next_line(&mut self) -> Result<bool, ReadError> {
        loop {
            self.line.clear();
            if self.buf.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            self.line_num += 1;
            if !self.line.trim().is_empty() {
                return Ok(true);
            }
        }
    }

    /// Read the leading count line.
    pub(crate) fn count(&mut self) -> Result<usize, ReadError> {
        if !self.next_line()? {
            return Err(ReadError::MissingCount {
                file: self.file.clone(),
            });
        }
        let string = self.line.trim();
        string.parse().map_err(|_| ReadError::BadCount {
            file: self.file.clone(),
            line_num: self.line_num,
            string: string.to_string(),
        })
    }

    /// Read the next record of exactly `N` floats. Returns `None` at the end
    /// of the file.
    pub(crate) fn record<const N: usize>(&mut self) -> Result<Option<[f64; N]>, ReadError> {
        if !self.next_line()? {
            return Ok(None);
        }

        let mut record = [0.0; N];
        let mut found = 0;
        for item in self.line.split_ascii_whitespace() {
            if found < N {
                record[found] = item.parse().map_err(|_| ReadError::ParseFloat {
                    file: self.file.clone(),
                    line_num: self.line_num,
                    string: item.to_string(),
                })?;
            }
            found += 1;
        }
        if found != N {
            return Err(ReadError::WrongFieldCount {
                file: self.file.clone(),
                line_num: self.line_num,
                expected: N,
                found,
            });
        }
        Ok(Some(record))
    }

    /// The error for a file that ran out of records after `found` of
    /// `expected`.
    pub(crate) fn truncated(&self, expected: usize, found: usize) -> ReadError {
        ReadError::Truncated {
            file: self.file.clone(),
            expected,
            found,
        }
    }
}

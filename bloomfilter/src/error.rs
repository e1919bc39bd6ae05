// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error types for bloom filter operations

use std::fmt;

/// ErrorKind is all kinds of Error of this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The capacity or target error rate cannot produce a valid filter.
    InvalidConfiguration,
    /// Two filters differ in hash count or bit length and cannot be merged.
    IncompatibleFilter,
    /// Bulk population was attempted on a filter that already has bits set.
    AlreadyPopulated,
}

impl ErrorKind {
    /// Convert this error kind instance into static str.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::InvalidConfiguration => "InvalidConfiguration",
            ErrorKind::IncompatibleFilter => "IncompatibleFilter",
            ErrorKind::AlreadyPopulated => "AlreadyPopulated",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

/// Error is the error struct returned by all fallible filter operations.
///
/// # Examples
///
/// ```
/// # use bloomfilter::error::Error;
/// # use bloomfilter::error::ErrorKind;
/// let err = Error::new(ErrorKind::InvalidConfiguration, "bad input");
/// assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
/// assert_eq!(err.message(), "bad input");
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: vec![],
        }
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Return error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return error's message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Return the key/value context attached to this error.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }
}

// Convenient constructors used within this crate.
impl Error {
    pub(crate) fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfiguration, msg)
    }

    pub(crate) fn incompatible_filter(
        what: &'static str,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self::new(
            ErrorKind::IncompatibleFilter,
            format!("{what} mismatch: expected {expected}, got {actual}"),
        )
    }

    pub(crate) fn already_populated(bits_used: u64) -> Self {
        Self::new(
            ErrorKind::AlreadyPopulated,
            "filter already holds elements; build a new filter and merge instead",
        )
        .with_context("bits_used", bits_used)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            for (i, (k, v)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", k, v)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

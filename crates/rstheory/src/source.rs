//! Data source descriptors attached to a test method.

use crate::config::DiscoveryConfig;
use crate::registry::ClassRef;
use crate::resolver::{MemberResolver, ResolveError};
use crate::row::{DataRow, RowMetadata};
use crate::value::{RawRow, Value};

/// One literal row declared inline on a test method.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineData {
    data: RawRow,
    metadata: RowMetadata,
}

impl InlineData {
    /// `None` is a row holding one `null` argument, not an empty row.
    pub fn new(data: Option<RawRow>) -> Self {
        InlineData {
            data: data.unwrap_or_else(|| vec![Value::Null]),
            metadata: RowMetadata::default(),
        }
    }

    pub fn row(data: RawRow) -> Self {
        InlineData::new(Some(data))
    }

    pub fn with_metadata(mut self, metadata: RowMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }

    pub fn metadata(&self) -> &RowMetadata {
        &self.metadata
    }
}

/// A reference to a static provider member on the test class.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberData {
    member_name: String,
    arguments: Vec<Value>,
}

impl MemberData {
    pub fn new(member_name: impl Into<String>, arguments: Vec<Value>) -> Self {
        MemberData {
            member_name: member_name.into(),
            arguments,
        }
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }
}

/// A declaration producing zero or more rows for a test method.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Inline(InlineData),
    Member(MemberData),
}

impl DataSource {
    pub fn inline(data: RawRow) -> Self {
        DataSource::Inline(InlineData::row(data))
    }

    pub fn member(member_name: impl Into<String>, arguments: Vec<Value>) -> Self {
        DataSource::Member(MemberData::new(member_name, arguments))
    }

    /// Raw argument rows for this source, resolved against `class`.
    pub fn get_raw_data(
        &self,
        class: ClassRef<'_>,
        config: DiscoveryConfig,
    ) -> Result<Vec<RawRow>, ResolveError> {
        Ok(self
            .get_data(class, config)?
            .into_iter()
            .map(|row| row.into_parts().0)
            .collect())
    }

    /// Rows with their metadata, resolved against `class`.
    pub fn get_data(
        &self,
        class: ClassRef<'_>,
        config: DiscoveryConfig,
    ) -> Result<Vec<DataRow>, ResolveError> {
        match self {
            DataSource::Inline(inline) => {
                inline
                    .metadata
                    .validate()
                    .map_err(|error| ResolveError::InvalidRow {
                        source_name: "inline data".to_string(),
                        row: 0,
                        error,
                    })?;
                Ok(vec![
                    DataRow::new(inline.data.clone()).with_metadata(inline.metadata.clone())
                ])
            }
            DataSource::Member(member) => {
                MemberResolver::new(class, config).resolve_rows(&member.member_name, &member.arguments)
            }
        }
    }

    /// Short description for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Inline(inline) => format!("inline data ({} values)", inline.data.len()),
            DataSource::Member(member) => format!("member data '{}'", member.member_name),
        }
    }
}

impl From<InlineData> for DataSource {
    fn from(inline: InlineData) -> Self {
        DataSource::Inline(inline)
    }
}

impl From<MemberData> for DataSource {
    fn from(member: MemberData) -> Self {
        DataSource::Member(member)
    }
}

//! Serializable snapshot of a specification graph.
//!
//! The export carries only what downstream consumers may depend on: tags and
//! values. Extractor origins and arena ids are left out, so exports of equal
//! graphs are byte-identical regardless of processing history.

use serde::Serialize;

use crate::facet::{FacetHolder, FacetValue, TypeLink};
use crate::spec::{MemberSpecification, MetamodelGraph, SpecRef};
use crate::types::TypeName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetamodelExport {
	pub types: Vec<TypeExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeExport {
	pub name: TypeName,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub super_type: Option<TypeName>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub sub_types: Vec<TypeName>,
	pub facets: Vec<FacetExport>,
	pub members: Vec<MemberExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberExport {
	pub name: String,
	pub kind: &'static str,
	pub facets: Vec<FacetExport>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub parameters: Vec<ParameterExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterExport {
	pub index: u16,
	pub name: String,
	pub facets: Vec<FacetExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetExport {
	pub tag: &'static str,
	pub precedence: &'static str,
	pub value: ValueExport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ValueExport {
	Flag,
	Bool(bool),
	Int(i64),
	Text(String),
	Type(TypeName),
	Unresolved(TypeName),
}

impl From<&FacetValue> for ValueExport {
	fn from(value: &FacetValue) -> Self {
		match value {
			FacetValue::Flag => Self::Flag,
			FacetValue::Bool(v) => Self::Bool(*v),
			FacetValue::Int(v) => Self::Int(*v),
			FacetValue::Text(v) => Self::Text(v.to_string()),
			FacetValue::Type(TypeLink::Unresolved(name)) => Self::Unresolved(name.clone()),
			FacetValue::Type(link) => Self::Type(link.name().clone()),
		}
	}
}

fn facets(holder: &FacetHolder) -> Vec<FacetExport> {
	holder
		.facets()
		.map(|facet| FacetExport {
			tag: facet.tag().as_str(),
			precedence: facet.precedence().as_str(),
			value: facet.value().into(),
		})
		.collect()
}

fn member(member: &MemberSpecification) -> MemberExport {
	MemberExport {
		name: member.name().to_string(),
		kind: member.kind().as_str(),
		facets: facets(member.facets()),
		parameters: member
			.parameters()
			.iter()
			.map(|p| ParameterExport {
				index: p.index(),
				name: p.name().to_string(),
				facets: facets(p.facets()),
			})
			.collect(),
	}
}

impl TypeExport {
	fn of(spec: &SpecRef) -> Self {
		Self {
			name: spec.name().clone(),
			super_type: spec.super_link().map(|link| link.name().clone()),
			sub_types: spec.sub_type_names(),
			facets: facets(spec.facets()),
			members: spec
				.members_if_loaded()
				.unwrap_or_default()
				.iter()
				.map(member)
				.collect(),
		}
	}
}

impl MetamodelExport {
	pub fn from_graph(graph: &MetamodelGraph) -> Self {
		Self {
			types: graph.iter().map(TypeExport::of).collect(),
		}
	}

	pub fn type_export(&self, name: &str) -> Option<&TypeExport> {
		self.types.iter().find(|t| t.name.as_str() == name)
	}

	pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string_pretty(self)
	}
}

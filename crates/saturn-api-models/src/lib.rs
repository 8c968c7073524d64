#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Request and response DTOs for the backend services the client calls.
//!
//! Response shapes are owned by the backends; only the fields the client must
//! inspect are typed here; everything else travels as `serde_json::Value`.
//! Wire names follow each backend's conventions, so most types rename to
//! camelCase.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat attribute document: attribute name to scalar or list value.
pub type Attributes = Map<String, Value>;

/// One step of the workspace/entity attribute patch protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum AttributeOperation {
    /// Set a scalar attribute, creating it when absent.
    #[serde(rename_all = "camelCase")]
    AddUpdateAttribute {
        /// Attribute being written.
        attribute_name: String,
        /// New value.
        add_update_attribute: Value,
    },
    /// Remove an attribute (scalar or list) entirely.
    #[serde(rename_all = "camelCase")]
    RemoveAttribute {
        /// Attribute being removed.
        attribute_name: String,
    },
    /// Append one member to a list attribute.
    #[serde(rename_all = "camelCase")]
    AddListMember {
        /// List attribute being extended.
        attribute_list_name: String,
        /// Member appended to the list.
        new_member: Value,
    },
}

/// Entity as served by an import source: a name, a type and raw attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityImport {
    /// Entity name.
    pub name: String,
    /// Entity type (`participant`, `sample`, ...).
    pub entity_type: String,
    /// Attribute document to apply.
    #[serde(default)]
    pub attributes: Attributes,
}

/// Entry of a batch upsert request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityUpsert {
    /// Entity name.
    pub name: String,
    /// Entity type.
    pub entity_type: String,
    /// Attribute operations applied to the entity.
    pub operations: Vec<AttributeOperation>,
}

/// Reference to a workspace by namespace and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceRef {
    /// Billing namespace owning the workspace.
    pub namespace: String,
    /// Workspace name.
    pub name: String,
}

impl WorkspaceRef {
    /// Build a reference from its parts.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// Reference to a method configuration inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodConfigRef {
    /// Configuration namespace.
    pub namespace: String,
    /// Configuration name.
    pub name: String,
    /// Workspace holding the configuration.
    pub workspace_name: WorkspaceRef,
}

/// Body of a method configuration copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodConfigCopy {
    /// Configuration being copied.
    pub source: MethodConfigRef,
    /// Where the copy lands.
    pub destination: MethodConfigRef,
}

/// Body of an entity copy between workspaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCopyRequest {
    /// Workspace the entities come from.
    pub source_workspace: WorkspaceRef,
    /// Workspace receiving the entities.
    pub destination_workspace: WorkspaceRef,
    /// Type of every copied entity.
    pub entity_type: String,
    /// Names of the entities to copy.
    pub entity_names: Vec<String>,
}

/// Body of a BagIt import request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagitImport {
    /// Location of the BagIt archive.
    #[serde(rename = "bagitURL")]
    pub bagit_url: String,
    /// Table format inside the archive.
    pub format: String,
}

/// Query parameters for a paginated entity listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityQuery {
    /// One-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Entities per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Attribute to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    /// `asc` or `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<String>,
    /// Free-text filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_terms: Option<String>,
}

impl EntityQuery {
    /// Render the populated parameters as query pairs, in declaration order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("pageSize", size.to_string()));
        }
        if let Some(field) = &self.sort_field {
            pairs.push(("sortField", field.clone()));
        }
        if let Some(direction) = &self.sort_direction {
            pairs.push(("sortDirection", direction.clone()));
        }
        if let Some(terms) = &self.filter_terms {
            pairs.push(("filterTerms", terms.clone()));
        }
        pairs
    }
}

/// Body of a billing project creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingProjectRequest {
    /// Name of the new project.
    pub project_name: String,
    /// Billing account charged for the project.
    pub billing_account: String,
}

/// Billing account project listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBillingInfoList {
    /// Projects attached to the account.
    #[serde(default)]
    pub project_billing_info: Vec<ProjectBillingInfo>,
}

/// One project attached to a billing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBillingInfo {
    /// Project identifier.
    pub project_id: String,
}

/// Terms-of-service record, used both for lookup parameters and acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TosRecord {
    /// Application identifier.
    pub appid: String,
    /// Terms version.
    pub tosversion: u32,
    /// Acceptance flag; absent on lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
}

/// Terms-of-service lookup response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TosStatus {
    /// Whether the user accepted the current terms.
    #[serde(default)]
    pub accepted: bool,
}

/// Body of an NIH account link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NihLinkRequest {
    /// Token returned by the NIH login flow.
    pub jwt: String,
}

/// Body of a data URI resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriResolutionRequest {
    /// URI to resolve.
    pub uri: String,
}

/// Object in a storage bucket; fields besides the name are kept raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketObject {
    /// Full object name, including any prefix.
    pub name: String,
    /// Remaining metadata as served.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Bucket listing response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectListing {
    /// Objects on this page.
    #[serde(default)]
    pub items: Vec<BucketObject>,
    /// Common prefixes when a delimiter was given.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Continuation token for the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// File contents handed to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name, appended to the destination prefix.
    pub name: String,
    /// MIME type sent as `Content-Type`.
    pub content_type: String,
    /// Raw file bytes.
    pub contents: Vec<u8>,
}

/// Support ticket as entered by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportRequest {
    /// Requester name.
    pub name: String,
    /// Requester email.
    pub email: String,
    /// Page the request was filed from.
    pub current_url: String,
    /// Ticket subject.
    pub subject: String,
    /// Ticket category (`question`, `bug`, ...).
    pub kind: String,
    /// Free-text description.
    pub description: String,
    /// Token of a previously uploaded attachment, if any.
    pub attachment_token: Option<String>,
}

/// Custom ticket field ids; the support desk keys its forms on these.
pub mod zendesk_fields {
    /// Ticket category.
    pub const KIND: u64 = 360_012_744_452;
    /// Ticket description.
    pub const DESCRIPTION: u64 = 360_007_369_412;
    /// Requester name.
    pub const NAME: u64 = 360_012_744_292;
    /// Requester email.
    pub const EMAIL: u64 = 360_012_782_111;
}

/// Wire envelope of a support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketEnvelope {
    /// Ticket payload.
    pub request: Ticket,
}

/// Support ticket payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Who filed the ticket.
    pub requester: TicketRequester,
    /// Ticket subject.
    pub subject: String,
    /// Form fields keyed by id.
    pub custom_fields: Vec<TicketField>,
    /// Initial comment.
    pub comment: TicketComment,
}

/// Ticket requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequester {
    /// Requester name.
    pub name: String,
    /// Requester email.
    pub email: String,
}

/// Custom ticket field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketField {
    /// Field id.
    pub id: u64,
    /// Field value.
    pub value: String,
}

/// Initial ticket comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketComment {
    /// Comment text.
    pub body: String,
    /// Attachment tokens.
    pub uploads: Vec<String>,
}

impl From<&SupportRequest> for TicketEnvelope {
    fn from(request: &SupportRequest) -> Self {
        Self {
            request: Ticket {
                requester: TicketRequester {
                    name: request.name.clone(),
                    email: request.email.clone(),
                },
                subject: request.subject.clone(),
                custom_fields: vec![
                    TicketField {
                        id: zendesk_fields::KIND,
                        value: request.kind.clone(),
                    },
                    TicketField {
                        id: zendesk_fields::DESCRIPTION,
                        value: request.description.clone(),
                    },
                    TicketField {
                        id: zendesk_fields::NAME,
                        value: request.name.clone(),
                    },
                    TicketField {
                        id: zendesk_fields::EMAIL,
                        value: request.email.clone(),
                    },
                ],
                comment: TicketComment {
                    body: format!(
                        "{}\n\n------------------\nSubmitted from: {}",
                        request.description, request.current_url
                    ),
                    uploads: request.attachment_token.iter().cloned().collect(),
                },
            },
        }
    }
}

/// Response of an attachment upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEnvelope {
    /// Upload record, including the token referenced by tickets.
    pub upload: Value,
}

/// Role a user may hold in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    /// May manage membership.
    Admin,
    /// Regular member.
    Member,
}

impl GroupRole {
    /// Path segment used by the group API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl Display for GroupRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for GroupRole {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

/// Role a user may hold on a billing project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingRole {
    /// May manage the project.
    Owner,
    /// May create workspaces billed to the project.
    User,
}

impl BillingRole {
    /// Path segment used by the billing API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::User => "user",
        }
    }
}

impl Display for BillingRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for BillingRole {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "user" => Ok(Self::User),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

/// Role name that matches no known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl Display for UnknownRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

/// A group member and every role they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// Member email.
    pub email: String,
    /// Roles held, admin first.
    pub roles: Vec<GroupRole>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attribute_operations_use_backend_field_names() {
        let ops = vec![
            AttributeOperation::AddUpdateAttribute {
                attribute_name: "description".into(),
                add_update_attribute: json!("cohort A"),
            },
            AttributeOperation::RemoveAttribute {
                attribute_name: "tags".into(),
            },
            AttributeOperation::AddListMember {
                attribute_list_name: "tags".into(),
                new_member: json!("rna"),
            },
        ];
        assert_eq!(
            serde_json::to_value(&ops).expect("serialize"),
            json!([
                {"op": "AddUpdateAttribute", "attributeName": "description", "addUpdateAttribute": "cohort A"},
                {"op": "RemoveAttribute", "attributeName": "tags"},
                {"op": "AddListMember", "attributeListName": "tags", "newMember": "rna"}
            ])
        );
    }

    #[test]
    fn support_request_maps_to_ticket_fields() {
        let request = SupportRequest {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            current_url: "https://app.example.org/#workspaces".into(),
            subject: "Cannot launch".into(),
            kind: "bug".into(),
            description: "Launch fails".into(),
            attachment_token: Some("tok-1".into()),
        };
        let value = serde_json::to_value(TicketEnvelope::from(&request)).expect("serialize");
        assert_eq!(value["request"]["requester"]["email"], "ada@example.org");
        assert_eq!(value["request"]["custom_fields"][0]["id"], 360_012_744_452_u64);
        assert_eq!(value["request"]["custom_fields"][0]["value"], "bug");
        assert_eq!(
            value["request"]["comment"]["body"],
            "Launch fails\n\n------------------\nSubmitted from: https://app.example.org/#workspaces"
        );
        assert_eq!(value["request"]["comment"]["uploads"], json!(["tok-1"]));
    }

    #[test]
    fn entity_query_pairs_skip_unset_fields() {
        let query = EntityQuery {
            page: Some(2),
            page_size: Some(50),
            sort_direction: Some("asc".into()),
            ..EntityQuery::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "2".to_string()),
                ("pageSize", "50".to_string()),
                ("sortDirection", "asc".to_string()),
            ]
        );
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("Admin".parse::<GroupRole>(), Ok(GroupRole::Admin));
        assert_eq!("owner".parse::<BillingRole>(), Ok(BillingRole::Owner));
        assert!("reader".parse::<GroupRole>().is_err());
    }

    #[test]
    fn bucket_listing_tolerates_missing_items() {
        let listing: ObjectListing =
            serde_json::from_value(json!({"kind": "storage#objects"})).expect("parse");
        assert!(listing.items.is_empty());

        let listing: ObjectListing = serde_json::from_value(json!({
            "items": [{"name": "notebooks/a.ipynb", "size": "12"}],
            "prefixes": ["notebooks/sub/"]
        }))
        .expect("parse");
        assert_eq!(listing.items[0].name, "notebooks/a.ipynb");
        assert_eq!(listing.items[0].metadata["size"], "12");
        assert_eq!(listing.prefixes, vec!["notebooks/sub/".to_string()]);
    }
}

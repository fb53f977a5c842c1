//! Request builders, one variant per wire operation
//!
//! The service multiplexes every operation through one URL scheme and an
//! `op` discriminator. Rather than a generic map-driven builder, each
//! operation is a variant of [`ApiRequest`] that knows its `op` name, HTTP
//! method, and body encoding; all variants share the signing and sending
//! pipeline in [`crate::transport`].

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::json;

use crate::types::{Authority, CustomHeaders, ListOptions};

/// A fully-specified API operation, ready to be signed and sent.
#[derive(Debug)]
pub enum ApiRequest {
    /// Create a directory
    Create { biz_attr: String },
    /// Stat an object or directory
    Stat,
    /// Delete an object or directory
    Delete,
    /// Update attributes of an object or directory
    Update {
        biz_attr: Option<String>,
        authority: Option<Authority>,
        custom_headers: CustomHeaders,
    },
    /// Copy an object to a new path
    Copy { dest_fileid: String, overwrite: bool },
    /// Move an object to a new path
    Move { dest_fileid: String, overwrite: bool },
    /// List a directory or prefix
    List { options: ListOptions },
    /// Whole-file upload with a content hash for integrity
    Upload {
        sha: String,
        biz_attr: String,
        content: Bytes,
        insert_only: bool,
    },
    /// Open a slice-upload session
    SliceInit {
        file_size: u64,
        slice_size: u64,
        biz_attr: String,
        insert_only: bool,
    },
    /// Send one slice within a session
    SliceData {
        session: String,
        offset: u64,
        index: u32,
        content: Bytes,
    },
    /// Finalize a session into a completed object
    SliceFinish { session: String, file_size: u64 },
}

/// The encoded body an [`ApiRequest`] turns into.
pub enum RequestBody {
    /// JSON document carrying the `op` field
    Json(serde_json::Value),
    /// Multipart form for payload-bearing operations
    Form(Form),
    /// Query-string pairs; the request carries no body
    Query(Vec<(String, String)>),
}

impl ApiRequest {
    /// Wire name of the operation
    pub fn op(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Stat => "stat",
            Self::Delete => "delete",
            Self::Update { .. } => "update",
            Self::Copy { .. } => "copy",
            Self::Move { .. } => "move",
            Self::List { .. } => "list",
            Self::Upload { .. } => "upload",
            Self::SliceInit { .. } => "init",
            Self::SliceData { .. } => "upload",
            Self::SliceFinish { .. } => "finish",
        }
    }

    /// Read-only operations travel as GET with a query string; everything
    /// else is a POST.
    pub fn method(&self) -> Method {
        match self {
            Self::Stat | Self::List { .. } => Method::GET,
            _ => Method::POST,
        }
    }

    /// Encode the operation into its body form. Consumes the request since
    /// payload bytes move into the multipart form.
    pub fn into_body(self) -> RequestBody {
        let op = self.op();
        match self {
            Self::Create { biz_attr } => RequestBody::Json(json!({
                "op": op,
                "biz_attr": biz_attr,
            })),

            Self::Stat => RequestBody::Query(vec![("op".into(), op.into())]),

            Self::Delete => RequestBody::Json(json!({ "op": op })),

            Self::Update {
                biz_attr,
                authority,
                custom_headers,
            } => {
                let mut body = json!({ "op": op });
                if let Some(biz_attr) = biz_attr {
                    body["biz_attr"] = json!(biz_attr);
                }
                if let Some(authority) = authority {
                    body["authority"] = json!(authority.as_str());
                }
                let mut headers = serde_json::Map::new();
                for (key, value) in custom_headers.iter() {
                    headers.insert(key.clone(), json!(value));
                }
                body["custom_headers"] = serde_json::Value::Object(headers);
                RequestBody::Json(body)
            }

            Self::Copy {
                dest_fileid,
                overwrite,
            }
            | Self::Move {
                dest_fileid,
                overwrite,
            } => RequestBody::Json(json!({
                "op": op,
                "dest_fileid": dest_fileid,
                "to_over_write": if overwrite { 1 } else { 0 },
            })),

            Self::List { options } => {
                let mut query = vec![
                    ("op".to_string(), op.to_string()),
                    ("num".to_string(), options.num.to_string()),
                    ("pattern".to_string(), options.pattern.as_str().to_string()),
                    ("order".to_string(), options.order.as_i32().to_string()),
                ];
                if let Some(context) = options.context {
                    query.push(("context".to_string(), context));
                }
                RequestBody::Query(query)
            }

            Self::Upload {
                sha,
                biz_attr,
                content,
                insert_only,
            } => {
                let form = Form::new()
                    .text("op", op)
                    .text("sha", sha)
                    .text("biz_attr", biz_attr)
                    .text("insertOnly", if insert_only { "1" } else { "0" })
                    .part("filecontent", Part::bytes(content.to_vec()));
                RequestBody::Form(form)
            }

            Self::SliceInit {
                file_size,
                slice_size,
                biz_attr,
                insert_only,
            } => {
                let form = Form::new()
                    .text("op", op)
                    .text("filesize", file_size.to_string())
                    .text("slice_size", slice_size.to_string())
                    .text("biz_attr", biz_attr)
                    .text("insertOnly", if insert_only { "1" } else { "0" });
                RequestBody::Form(form)
            }

            Self::SliceData {
                session,
                offset,
                index,
                content,
            } => {
                let form = Form::new()
                    .text("op", op)
                    .text("session", session)
                    .text("offset", offset.to_string())
                    .text("index", index.to_string())
                    .part("filecontent", Part::bytes(content.to_vec()));
                RequestBody::Form(form)
            }

            Self::SliceFinish { session, file_size } => {
                let form = Form::new()
                    .text("op", op)
                    .text("session", session)
                    .text("filesize", file_size.to_string());
                RequestBody::Form(form)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ListPattern, SortOrder};

    #[test]
    fn read_operations_use_get() {
        assert_eq!(ApiRequest::Stat.method(), Method::GET);
        let list = ApiRequest::List {
            options: ListOptions::default(),
        };
        assert_eq!(list.method(), Method::GET);
        assert_eq!(ApiRequest::Delete.method(), Method::POST);
    }

    #[test]
    fn delete_body_carries_op() {
        match ApiRequest::Delete.into_body() {
            RequestBody::Json(body) => assert_eq!(body["op"], "delete"),
            _ => panic!("delete should encode as JSON"),
        }
    }

    #[test]
    fn copy_encodes_overwrite_flag() {
        let request = ApiRequest::Copy {
            dest_fileid: "/dst.txt".into(),
            overwrite: false,
        };
        match request.into_body() {
            RequestBody::Json(body) => {
                assert_eq!(body["op"], "copy");
                assert_eq!(body["dest_fileid"], "/dst.txt");
                assert_eq!(body["to_over_write"], 0);
            }
            _ => panic!("copy should encode as JSON"),
        }
    }

    #[test]
    fn list_encodes_query_pairs() {
        let request = ApiRequest::List {
            options: ListOptions {
                num: 50,
                pattern: ListPattern::FileOnly,
                order: SortOrder::Desc,
                context: Some("tok".into()),
            },
        };
        match request.into_body() {
            RequestBody::Query(query) => {
                assert!(query.contains(&("op".into(), "list".into())));
                assert!(query.contains(&("num".into(), "50".into())));
                assert!(query.contains(&("pattern".into(), "eListFileOnly".into())));
                assert!(query.contains(&("order".into(), "1".into())));
                assert!(query.contains(&("context".into(), "tok".into())));
            }
            _ => panic!("list should encode as a query string"),
        }
    }

    #[test]
    fn update_omits_absent_fields() {
        let request = ApiRequest::Update {
            biz_attr: None,
            authority: Some(Authority::PrivateWritePublicRead),
            custom_headers: CustomHeaders::new().with("Content-Type", "text/plain"),
        };
        match request.into_body() {
            RequestBody::Json(body) => {
                assert!(body.get("biz_attr").is_none());
                assert_eq!(body["authority"], "eWPrivateRPublic");
                assert_eq!(body["custom_headers"]["Content-Type"], "text/plain");
            }
            _ => panic!("update should encode as JSON"),
        }
    }

    #[test]
    fn slice_ops_use_protocol_wire_names() {
        let init = ApiRequest::SliceInit {
            file_size: 100,
            slice_size: 10,
            biz_attr: String::new(),
            insert_only: true,
        };
        assert_eq!(init.op(), "init");

        let data = ApiRequest::SliceData {
            session: "s".into(),
            offset: 0,
            index: 0,
            content: Bytes::from_static(b"x"),
        };
        assert_eq!(data.op(), "upload");

        let finish = ApiRequest::SliceFinish {
            session: "s".into(),
            file_size: 100,
        };
        assert_eq!(finish.op(), "finish");
    }
}

//! Static route table of the app shell.
//!
//! Two views exist: the operadoras listing at `/` and the detail view at
//! `/operadoras/{cnpj}`. Matching ignores the query string and fragment and
//! tolerates one trailing slash. The `cnpj` segment is percent-decoded before
//! being handed to the view.

use std::fmt;

use percent_encoding::percent_decode_str;

use crate::client::encode_segment;

/// A resolved view and its route parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Paginated, searchable listing with aggregate statistics.
    List,
    /// One operadora and its expense records.
    Detail { cnpj: String },
}

impl Route {
    /// Match `path` against the route table. Returns `None` for unknown paths.
    pub fn resolve(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };

        if path == "/" || path.is_empty() {
            return Some(Route::List);
        }

        let segment = path.strip_prefix("/operadoras/")?;
        if segment.is_empty() || segment.contains('/') {
            return None;
        }
        let cnpj = percent_decode_str(segment).decode_utf8().ok()?;
        Some(Route::Detail {
            cnpj: cnpj.into_owned(),
        })
    }

    /// The canonical path of this route.
    pub fn path(&self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::Detail { cnpj } => format!("/operadoras/{}", encode_segment(cnpj)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_resolves_to_list() {
        assert_eq!(Route::resolve("/"), Some(Route::List));
        assert_eq!(Route::resolve(""), Some(Route::List));
        assert_eq!(Route::resolve("/?page=2&q=unimed"), Some(Route::List));
    }

    #[test]
    fn detail_path_carries_cnpj() {
        assert_eq!(
            Route::resolve("/operadoras/ABC123"),
            Some(Route::Detail {
                cnpj: "ABC123".to_string()
            })
        );
        assert_eq!(
            Route::resolve("/operadoras/ABC123/"),
            Some(Route::Detail {
                cnpj: "ABC123".to_string()
            })
        );
        assert_eq!(
            Route::resolve("/operadoras/ABC123#despesas"),
            Some(Route::Detail {
                cnpj: "ABC123".to_string()
            })
        );
    }

    #[test]
    fn detail_cnpj_is_percent_decoded() {
        assert_eq!(
            Route::resolve("/operadoras/12.345.678%2F0001-99"),
            Some(Route::Detail {
                cnpj: "12.345.678/0001-99".to_string()
            })
        );
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        assert_eq!(Route::resolve("/operadoras"), None);
        assert_eq!(Route::resolve("/operadoras/"), None);
        assert_eq!(Route::resolve("/operadoras/1/despesas"), None);
        assert_eq!(Route::resolve("/estatisticas"), None);
        assert_eq!(Route::resolve("/operadoras/%FF"), None);
    }

    #[test]
    fn path_is_inverse_of_resolve() {
        let route = Route::Detail {
            cnpj: "12.345.678/0001-99".to_string(),
        };
        assert_eq!(route.path(), "/operadoras/12.345.678%2F0001-99");
        assert_eq!(Route::resolve(&route.path()), Some(route));
        assert_eq!(Route::List.to_string(), "/");
    }
}

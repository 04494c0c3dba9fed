use uuid::Uuid;

/// The places a submission request may name the acting learner, in the order
/// they win: an explicit id in the multipart body, an explicit id in the
/// query string, the authenticated session.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySources {
    pub body: Option<Uuid>,
    pub query: Option<Uuid>,
    pub session: Option<Uuid>,
}

impl IdentitySources {
    /// First source that names an identity, None when none does. Pure;
    /// callers decide how a missing identity is reported.
    pub fn resolve(&self) -> Option<Uuid> {
        [self.body, self.query, self.session]
            .into_iter()
            .flatten()
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Uuid, Uuid, Uuid) {
        (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7())
    }

    #[test]
    fn body_wins_over_query_and_session() {
        let (a, b, c) = ids();
        let sources = IdentitySources {
            body: Some(a),
            query: Some(b),
            session: Some(c),
        };
        assert_eq!(sources.resolve(), Some(a));
    }

    #[test]
    fn query_wins_over_session() {
        let (_, b, c) = ids();
        let sources = IdentitySources {
            body: None,
            query: Some(b),
            session: Some(c),
        };
        assert_eq!(sources.resolve(), Some(b));
    }

    #[test]
    fn session_is_the_fallback() {
        let (_, _, c) = ids();
        let sources = IdentitySources {
            session: Some(c),
            ..Default::default()
        };
        assert_eq!(sources.resolve(), Some(c));
    }

    #[test]
    fn no_source_resolves_to_none() {
        assert_eq!(IdentitySources::default().resolve(), None);
    }
}

use super::cursor::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PagingArgs {
    pub first: Option<i64>,
    pub last: Option<i64>,
    pub before: Option<Cursor>,
    pub after: Option<Cursor>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagingDirection {
    Forward,
    Backward,
}

/// Validated pagination arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paging {
    pub direction: PagingDirection,
    pub count: usize,
    /// `after` when paging forward, `before` when paging backward.
    pub cursor: Option<Cursor>,
}

pub type PagingResult<T> = Result<T, PagingError>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PagingError {
    #[error("Argument `first` or `last` should be specified")]
    NoForwardOrBackward,
    #[error("Argument `first` must be a positive integer")]
    FirstNotPositive,
    #[error("Argument `last` must be a positive integer")]
    LastNotPositive,
    #[error("Argument `last` cannot be combined with `first`")]
    BothForwardAndBackward,
    #[error("Argument `first` cannot be combined with `before`")]
    FirstWithBefore,
    #[error("Argument `last` cannot be combined with `after`")]
    LastWithAfter,
}

impl TryFrom<PagingArgs> for Paging {
    type Error = PagingError;

    fn try_from(args: PagingArgs) -> PagingResult<Self> {
        let PagingArgs {
            first,
            last,
            before,
            after,
        } = args;

        if first.is_none() && last.is_none() {
            return Err(PagingError::NoForwardOrBackward);
        }
        if matches!(first, Some(n) if n <= 0) {
            return Err(PagingError::FirstNotPositive);
        }
        if matches!(last, Some(n) if n <= 0) {
            return Err(PagingError::LastNotPositive);
        }

        match (first, last) {
            (Some(_), Some(_)) => Err(PagingError::BothForwardAndBackward),
            (Some(_), None) if before.is_some() => Err(PagingError::FirstWithBefore),
            (None, Some(_)) if after.is_some() => Err(PagingError::LastWithAfter),
            (Some(count), None) => Ok(Self {
                direction: PagingDirection::Forward,
                count: count as usize,
                cursor: after,
            }),
            (None, Some(count)) => Ok(Self {
                direction: PagingDirection::Backward,
                count: count as usize,
                cursor: before,
            }),
            (None, None) => Err(PagingError::NoForwardOrBackward),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(first: Option<i64>, last: Option<i64>) -> PagingArgs {
        PagingArgs {
            first,
            last,
            ..Default::default()
        }
    }

    #[test]
    fn test_exactly_one_page_size_is_required() {
        assert_eq!(
            Paging::try_from(args(None, None)),
            Err(PagingError::NoForwardOrBackward)
        );
        assert_eq!(
            Paging::try_from(args(Some(3), Some(3))),
            Err(PagingError::BothForwardAndBackward)
        );
    }

    #[test]
    fn test_page_size_must_be_positive() {
        assert_eq!(
            Paging::try_from(args(Some(0), None)),
            Err(PagingError::FirstNotPositive)
        );
        assert_eq!(
            Paging::try_from(args(None, Some(-2))),
            Err(PagingError::LastNotPositive)
        );
    }

    #[test]
    fn test_cursor_must_match_direction() {
        let first_before = PagingArgs {
            first: Some(2),
            before: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(
            Paging::try_from(first_before),
            Err(PagingError::FirstWithBefore)
        );

        let last_after = PagingArgs {
            last: Some(2),
            after: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(Paging::try_from(last_after), Err(PagingError::LastWithAfter));
    }

    #[test]
    fn test_backward_paging_takes_the_before_cursor() {
        let paging = Paging::try_from(PagingArgs {
            last: Some(5),
            before: Some("c".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(paging.direction, PagingDirection::Backward);
        assert_eq!(paging.count, 5);
        assert_eq!(paging.cursor.as_deref(), Some("c"));
    }
}

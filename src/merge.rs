use crate::stats::PartitionResult;

/// Combines two partial results, consuming both and reusing the larger map.
pub fn merge<'a>(a: PartitionResult<'a>, b: PartitionResult<'a>) -> PartitionResult<'a> {
    let (mut acc, other) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    for (key, stat) in other {
        acc.entry(key)
            .and_modify(|e| e.merge(&stat))
            .or_insert(stat);
    }
    acc
}

/// Folds any number of partial results into one.
pub fn merge_all<'a, I>(parts: I) -> PartitionResult<'a>
where
    I: IntoIterator<Item = PartitionResult<'a>>,
{
    parts.into_iter().fold(PartitionResult::default(), merge)
}

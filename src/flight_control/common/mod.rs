pub(crate) mod pinned_dt;

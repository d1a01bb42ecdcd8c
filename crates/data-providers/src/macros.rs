/// Builds a `serde_json::Map` of GraphQL query variables.
macro_rules! json_map {
    ($($key:expr_2021 => $value:expr_2021),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = ::serde_json::Map::<String, ::serde_json::Value>::new();
        $(
            map.insert(($key).into(), ($value).into());
        )*
        map
    }}
}

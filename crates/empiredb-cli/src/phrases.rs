use crate::cli::PhrasesArgs;
use crate::output::{features_table, phrases_table, print_header};
use empiredb::{DbmsFeature, DbmsHandler, Phrase, dbms_by_name};

const FEATURES: [DbmsFeature; 7] = [
    DbmsFeature::CreateSchema,
    DbmsFeature::Sequences,
    DbmsFeature::QueryLimitRows,
    DbmsFeature::QuerySkipRows,
    DbmsFeature::Batch,
    DbmsFeature::GeneratedKeys,
    DbmsFeature::DdlColumnDefault,
];

pub fn run(args: PhrasesArgs) -> anyhow::Result<()> {
    let dbms = dbms_by_name(&args.dialect)?;

    print_header(&format!("{} phrases", dbms.name()));
    println!("{}", phrases_table(phrase_rows(dbms.as_ref())));

    print_header(&format!("{} features (pagination: {:?})", dbms.name(), dbms.pagination()));
    let features: Vec<(String, bool)> = FEATURES
        .iter()
        .map(|f| (format!("{f:?}"), dbms.is_supported(*f)))
        .collect();
    println!(
        "{}",
        features_table(features.iter().map(|(name, on)| (name.as_str(), *on)))
    );
    Ok(())
}

pub fn phrase_rows(dbms: &dyn DbmsHandler) -> Vec<(&'static str, Option<&'static str>)> {
    Phrase::ALL
        .iter()
        .map(|p| (p.name(), dbms.phrase(*p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use empiredb::dbms;

    #[test]
    fn lists_every_phrase() {
        let rows = phrase_rows(dbms::postgres().as_ref());
        assert_eq!(rows.len(), Phrase::ALL.len());
        let (_, template) = rows
            .iter()
            .find(|(name, _)| *name == "SQL_FUNC_UPPER")
            .unwrap();
        assert!(template.is_some());
    }

    #[test]
    fn generic_lacks_string_aggregation() {
        let rows = phrase_rows(dbms::generic().as_ref());
        let (_, template) = rows
            .iter()
            .find(|(name, _)| *name == "SQL_FUNC_STRAGG")
            .unwrap();
        assert!(template.is_none());
    }
}

// src/db/filter_sql.rs
//
// Traduz um `QueryPlan` para SQL com o `QueryBuilder` do sqlx.
// Nomes de coluna vêm das tabelas estáticas de filtros (nunca da requisição);
// todos os valores vão como bind.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::services::filter::{IdSets, Predicate, QueryPlan, SortDirection};

#[derive(Debug, Clone, Copy)]
pub struct SqlCollection {
    pub table: &'static str,
    pub alias: &'static str,
}

pub const INGREDIENTS: SqlCollection = SqlCollection { table: "ingredients", alias: "i" };
pub const COCKTAILS: SqlCollection = SqlCollection { table: "cocktails", alias: "c" };

/// SELECT das linhas filtradas e ordenadas. `paginate = false` devolve tudo
/// (usado quando ainda há filtros em memória pela frente).
pub fn select_page<'a>(
    collection: SqlCollection,
    bar_id: Uuid,
    plan: &QueryPlan,
    ids: &IdSets,
    paginate: bool,
) -> QueryBuilder<'a, Postgres> {
    let select = format!("{}.*", collection.alias);
    let mut qb = filtered(&select, collection, bar_id, plan, ids);

    let direction = match plan.sort.direction {
        SortDirection::Asc => "ASC NULLS FIRST",
        SortDirection::Desc => "DESC NULLS LAST",
    };
    qb.push(format!(
        " ORDER BY {alias}.{column} {direction}, {alias}.id ASC",
        alias = collection.alias,
        column = plan.sort.column,
    ));

    if paginate {
        qb.push(" LIMIT ");
        qb.push_bind(plan.page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(plan.page.offset());
    }

    qb
}

pub fn count<'a>(
    collection: SqlCollection,
    bar_id: Uuid,
    plan: &QueryPlan,
    ids: &IdSets,
) -> QueryBuilder<'a, Postgres> {
    filtered("COUNT(*)", collection, bar_id, plan, ids)
}

fn filtered<'a>(
    select: &str,
    collection: SqlCollection,
    bar_id: Uuid,
    plan: &QueryPlan,
    ids: &IdSets,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {select} FROM {table} {alias} WHERE {alias}.bar_id = ",
        table = collection.table,
        alias = collection.alias,
    ));
    qb.push_bind(bar_id);

    for predicate in &plan.predicates {
        qb.push(" AND ");
        push_predicate(&mut qb, collection.alias, predicate, ids);
    }

    qb
}

fn push_predicate(
    qb: &mut QueryBuilder<'_, Postgres>,
    alias: &str,
    predicate: &Predicate,
    ids: &IdSets,
) {
    match predicate {
        Predicate::Equals { column, value } => {
            qb.push(format!("{alias}.{column} = "));
            qb.push_bind(*value);
        }
        Predicate::Contains { column, needle } => {
            qb.push(format!("{alias}.{column} ILIKE "));
            qb.push_bind(format!("%{}%", escape_like(needle)));
            qb.push(" ESCAPE '\\'");
        }
        Predicate::StartsWith { column, prefix } => {
            qb.push(format!("{alias}.{column} LIKE "));
            qb.push_bind(format!("{}%", escape_like(prefix)));
            qb.push(" ESCAPE '\\'");
        }
        Predicate::AtLeast { column, value } => {
            qb.push(format!("{alias}.{column} >= "));
            qb.push_bind(*value);
        }
        Predicate::AtMost { column, value } => {
            qb.push(format!("{alias}.{column} <= "));
            qb.push_bind(*value);
        }
        Predicate::IdIn(source) => {
            // Conjunto vazio => ANY('{}') => nenhuma linha.
            qb.push(format!("{alias}.id = ANY("));
            qb.push_bind(ids.ids(*source));
            qb.push(")");
        }
        Predicate::HasIngredient(ingredient_id) => {
            qb.push(format!(
                "EXISTS (SELECT 1 FROM cocktail_ingredients ci \
                 WHERE ci.cocktail_id = {alias}.id AND ci.ingredient_id = "
            ));
            qb.push_bind(*ingredient_id);
            qb.push(")");
        }
    }
}

// '%' e '_' digitados pelo usuário são literais, não curingas.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::filter::{IdSource, COCKTAIL_QUERY, INGREDIENT_QUERY};

    #[test]
    fn every_query_is_scoped_to_the_bar() {
        let plan = INGREDIENT_QUERY.plan(Vec::<(&str, &str)>::new()).unwrap();
        let qb = select_page(INGREDIENTS, Uuid::new_v4(), &plan, &IdSets::default(), true);
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT i.* FROM ingredients i WHERE i.bar_id = $1"));
        assert!(sql.contains("ORDER BY i.name ASC NULLS FIRST, i.id ASC"));
        assert!(sql.ends_with("LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn predicates_are_joined_with_and() {
        let plan = INGREDIENT_QUERY
            .plan([("name", "vod"), ("strength_min", "30"), ("sort", "-strength")])
            .unwrap();
        let qb = select_page(INGREDIENTS, Uuid::new_v4(), &plan, &IdSets::default(), false);
        let sql = qb.sql();
        assert!(sql.contains("AND i.strength >= $2"));
        assert!(sql.contains("AND i.name ILIKE $3 ESCAPE '\\'"));
        assert!(sql.contains("ORDER BY i.strength DESC NULLS LAST"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn id_sets_become_any_clauses() {
        let plan = INGREDIENT_QUERY.plan([("on_shelf", "true")]).unwrap();
        let mut ids = IdSets::default();
        ids.insert(IdSource::Shelf, Default::default());
        let qb = count(INGREDIENTS, Uuid::new_v4(), &plan, &ids);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM ingredients i WHERE i.bar_id = $1 AND i.id = ANY($2)"
        );
    }

    #[test]
    fn cocktail_ingredient_filter_uses_exists() {
        let id = Uuid::new_v4().to_string();
        let plan = COCKTAIL_QUERY.plan([("ingredient_id", id.as_str())]).unwrap();
        let qb = count(COCKTAILS, Uuid::new_v4(), &plan, &IdSets::default());
        assert!(qb
            .sql()
            .contains("EXISTS (SELECT 1 FROM cocktail_ingredients ci WHERE ci.cocktail_id = c.id"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }
}

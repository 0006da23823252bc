// src/services/filter.rs
//
// Motor de filtros declarativo. Cada coleção (ingredientes, coquetéis) é
// descrita por uma tabela estática `{nome -> (tipo, efeito)}`; um único motor
// valida os parâmetros da requisição e gera um `QueryPlan`. Adicionar um
// filtro = adicionar uma linha na tabela.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// ---
// 1. Descritores
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Igualdade de UUID.
    Exact,
    /// Substring, sem diferenciar maiúsculas.
    Partial,
    /// "Começa com", diferenciando maiúsculas.
    Prefix,
    /// `true` ativa o efeito, `false` não restringe nada.
    Boolean,
    /// Booleano cuja simples presença ativa o efeito, qualquer que seja o valor.
    Presence,
    /// Limite decimal (mínimo ou máximo, conforme o efeito).
    Numeric,
}

/// Conjuntos de ids que dependem de quem chama (carregados por requisição).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdSource {
    ShoppingList,
    Shelf,
    MainIngredients,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEffect {
    /// Compara uma coluna da própria tabela.
    Column(&'static str),
    Minimum(&'static str),
    Maximum(&'static str),
    /// Restringe o id da linha a um conjunto carregado por requisição.
    IdIn(IdSource),
    /// O coquetel tem uma linha de receita com este ingrediente.
    HasIngredient,
    /// O coquetel pode ser feito com a prateleira de quem chama.
    Makeable,
}

#[derive(Debug, Clone, Copy)]
pub struct FilterDescriptor {
    pub name: &'static str,
    pub kind: FilterKind,
    pub effect: FilterEffect,
}

const fn filter(name: &'static str, kind: FilterKind, effect: FilterEffect) -> FilterDescriptor {
    FilterDescriptor { name, kind, effect }
}

pub const INGREDIENT_FILTERS: &[FilterDescriptor] = &[
    filter("id", FilterKind::Exact, FilterEffect::Column("id")),
    filter("name", FilterKind::Partial, FilterEffect::Column("name")),
    filter("name_exact", FilterKind::Prefix, FilterEffect::Column("name")),
    filter("category_id", FilterKind::Exact, FilterEffect::Column("ingredient_category_id")),
    filter("origin", FilterKind::Partial, FilterEffect::Column("origin")),
    filter("user_id", FilterKind::Exact, FilterEffect::Column("user_id")),
    filter("on_shopping_list", FilterKind::Presence, FilterEffect::IdIn(IdSource::ShoppingList)),
    filter("on_shelf", FilterKind::Boolean, FilterEffect::IdIn(IdSource::Shelf)),
    filter("strength_min", FilterKind::Numeric, FilterEffect::Minimum("strength")),
    filter("strength_max", FilterKind::Numeric, FilterEffect::Maximum("strength")),
    filter("main_ingredients", FilterKind::Boolean, FilterEffect::IdIn(IdSource::MainIngredients)),
];

pub const COCKTAIL_FILTERS: &[FilterDescriptor] = &[
    filter("id", FilterKind::Exact, FilterEffect::Column("id")),
    filter("name", FilterKind::Partial, FilterEffect::Column("name")),
    filter("name_exact", FilterKind::Prefix, FilterEffect::Column("name")),
    filter("user_id", FilterKind::Exact, FilterEffect::Column("user_id")),
    filter("glass_id", FilterKind::Exact, FilterEffect::Column("glass_id")),
    filter("cocktail_method_id", FilterKind::Exact, FilterEffect::Column("cocktail_method_id")),
    filter("abv_min", FilterKind::Numeric, FilterEffect::Minimum("abv")),
    filter("abv_max", FilterKind::Numeric, FilterEffect::Maximum("abv")),
    filter("ingredient_id", FilterKind::Exact, FilterEffect::HasIngredient),
    filter("on_shelf", FilterKind::Boolean, FilterEffect::Makeable),
];

// ---
// 2. Plano gerado
// ---

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals { column: &'static str, value: Uuid },
    Contains { column: &'static str, needle: String },
    StartsWith { column: &'static str, prefix: String },
    AtLeast { column: &'static str, value: Decimal },
    AtMost { column: &'static str, value: Decimal },
    IdIn(IdSource),
    HasIngredient(Uuid),
}

impl Predicate {
    /// Menor = mais seletivo / mais barato. Só muda a ordem de avaliação.
    fn cost_rank(&self) -> u8 {
        match self {
            Predicate::Equals { .. } => 0,
            Predicate::IdIn(_) => 1,
            Predicate::HasIngredient(_) => 2,
            Predicate::AtLeast { .. } | Predicate::AtMost { .. } => 3,
            Predicate::StartsWith { .. } => 4,
            Predicate::Contains { .. } => 5,
        }
    }
}

/// Filtros que não viram SQL: resolvidos em memória depois da consulta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    Makeable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
pub struct Page {
    #[validate(range(min = 1, message = "A página deve ser maior ou igual a 1."))]
    pub number: u32,
    #[validate(range(min = 1, max = 100, message = "per_page deve estar entre 1 e 100."))]
    pub per_page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { number: 1, per_page: 50 }
    }
}

impl Page {
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub predicates: Vec<Predicate>,
    pub post_filters: Vec<PostFilter>,
    pub sort: Sort,
    pub page: Page,
}

impl QueryPlan {
    /// Fontes de ids que precisam ser carregadas antes de executar o plano.
    pub fn id_sources(&self) -> HashSet<IdSource> {
        self.predicates
            .iter()
            .filter_map(|p| match p {
                Predicate::IdIn(source) => Some(*source),
                _ => None,
            })
            .collect()
    }

    pub fn needs_post_filter(&self, filter: PostFilter) -> bool {
        self.post_filters.contains(&filter)
    }
}

// ---
// 3. Conjuntos de ids por requisição
// ---

#[derive(Debug, Clone, Default)]
pub struct IdSets {
    sets: HashMap<IdSource, HashSet<Uuid>>,
}

impl IdSets {
    pub fn insert(&mut self, source: IdSource, ids: HashSet<Uuid>) {
        self.sets.insert(source, ids);
    }

    /// Fonte não carregada = conjunto vazio (falha fechada).
    pub fn ids(&self, source: IdSource) -> Vec<Uuid> {
        self.sets
            .get(&source)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

// ---
// 4. O motor
// ---

const SORT_PARAM: &str = "sort";
const PAGE_PARAM: &str = "page";
const PER_PAGE_PARAM: &str = "per_page";

#[derive(Debug, Clone, Copy)]
pub struct FilterEngine {
    filters: &'static [FilterDescriptor],
    sorts: &'static [&'static str],
    default_sort: &'static str,
}

pub const INGREDIENT_QUERY: FilterEngine = FilterEngine {
    filters: INGREDIENT_FILTERS,
    sorts: &["name", "created_at", "strength"],
    default_sort: "name",
};

pub const COCKTAIL_QUERY: FilterEngine = FilterEngine {
    filters: COCKTAIL_FILTERS,
    sorts: &["name", "created_at", "abv"],
    default_sort: "name",
};

impl FilterEngine {
    pub fn filters(&self) -> &'static [FilterDescriptor] {
        self.filters
    }

    /// Valida todos os parâmetros e monta o plano. Qualquer nome fora da
    /// tabela (ou fora de sort/page/per_page) derruba a requisição inteira.
    pub fn plan<'a, I>(&self, params: I) -> Result<QueryPlan, AppError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut predicates = Vec::new();
        let mut post_filters = Vec::new();
        let mut sort = Sort { column: self.default_sort, direction: SortDirection::Asc };
        let mut page = Page::default();

        for (name, value) in params {
            if !seen.insert(name) {
                return Err(AppError::DuplicateParameter(name.to_string()));
            }

            match name {
                SORT_PARAM => sort = self.parse_sort(value)?,
                PAGE_PARAM => page.number = parse_value::<u32>(name, value, "inteiro positivo")?,
                PER_PAGE_PARAM => {
                    page.per_page = parse_value::<u32>(name, value, "inteiro positivo")?
                }
                _ => {
                    let descriptor = self
                        .filters
                        .iter()
                        .find(|d| d.name == name)
                        .ok_or_else(|| AppError::UnknownFilter(name.to_string()))?;

                    match compile(descriptor, value)? {
                        Compiled::Predicate(p) => predicates.push(p),
                        Compiled::Post(f) => post_filters.push(f),
                        Compiled::Nothing => {}
                    }
                }
            }
        }

        page.validate()?;

        // AND é comutativo: reordenar por custo não muda o resultado.
        predicates.sort_by_key(Predicate::cost_rank);

        tracing::debug!(
            predicates = predicates.len(),
            post_filters = post_filters.len(),
            sort = sort.column,
            "Plano de consulta montado"
        );

        Ok(QueryPlan { predicates, post_filters, sort, page })
    }

    fn parse_sort(&self, value: &str) -> Result<Sort, AppError> {
        let (key, direction) = match value.strip_prefix('-') {
            Some(key) => (key, SortDirection::Desc),
            None => (value, SortDirection::Asc),
        };

        let column = self
            .sorts
            .iter()
            .copied()
            .find(|s| *s == key)
            .ok_or_else(|| AppError::UnknownSort(value.to_string()))?;

        Ok(Sort { column, direction })
    }
}

enum Compiled {
    Predicate(Predicate),
    Post(PostFilter),
    Nothing,
}

fn compile(descriptor: &FilterDescriptor, value: &str) -> Result<Compiled, AppError> {
    let name = descriptor.name;

    let compiled = match (descriptor.kind, descriptor.effect) {
        (FilterKind::Exact, FilterEffect::Column(column)) => Compiled::Predicate(Predicate::Equals {
            column,
            value: parse_value::<Uuid>(name, value, "UUID")?,
        }),
        (FilterKind::Exact, FilterEffect::HasIngredient) => Compiled::Predicate(
            Predicate::HasIngredient(parse_value::<Uuid>(name, value, "UUID")?),
        ),
        (FilterKind::Partial, FilterEffect::Column(column)) => {
            Compiled::Predicate(Predicate::Contains { column, needle: value.to_string() })
        }
        (FilterKind::Prefix, FilterEffect::Column(column)) => {
            Compiled::Predicate(Predicate::StartsWith { column, prefix: value.to_string() })
        }
        (FilterKind::Numeric, FilterEffect::Minimum(column)) => {
            Compiled::Predicate(Predicate::AtLeast {
                column,
                value: parse_value::<Decimal>(name, value, "número decimal")?,
            })
        }
        (FilterKind::Numeric, FilterEffect::Maximum(column)) => {
            Compiled::Predicate(Predicate::AtMost {
                column,
                value: parse_value::<Decimal>(name, value, "número decimal")?,
            })
        }
        (FilterKind::Boolean, effect) => {
            if !parse_bool(name, value)? {
                return Ok(Compiled::Nothing);
            }
            boolean_effect(descriptor, effect)?
        }
        (FilterKind::Presence, effect) => {
            // O valor ainda precisa ser um booleano válido.
            parse_bool(name, value)?;
            boolean_effect(descriptor, effect)?
        }
        _ => return Err(misconfigured(descriptor)),
    };

    Ok(compiled)
}

fn boolean_effect(
    descriptor: &FilterDescriptor,
    effect: FilterEffect,
) -> Result<Compiled, AppError> {
    match effect {
        FilterEffect::IdIn(source) => Ok(Compiled::Predicate(Predicate::IdIn(source))),
        FilterEffect::Makeable => Ok(Compiled::Post(PostFilter::Makeable)),
        _ => Err(misconfigured(descriptor)),
    }
}

fn misconfigured(descriptor: &FilterDescriptor) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!(
        "Filtro '{}' com tipo {:?} incompatível com o efeito {:?}",
        descriptor.name,
        descriptor.kind,
        descriptor.effect
    ))
}

fn parse_value<T: FromStr>(name: &str, value: &str, expected: &'static str) -> Result<T, AppError> {
    value.parse::<T>().map_err(|_| AppError::InvalidFilterValue {
        name: name.to_string(),
        value: value.to_string(),
        expected,
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, AppError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AppError::InvalidFilterValue {
            name: name.to_string(),
            value: value.to_string(),
            expected: "booleano (true/false)",
        }),
    }
}

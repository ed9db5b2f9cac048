//! Sample entity types with explicitly registered shapes
//!
//! Storage property names are capitalized, matching the conventions of
//! the data model this library talks to.

use cypherbind::model::{CypherValue, NodeValue, PropertyBag, RelationshipValue, Row};
use cypherbind::schema::convert::{optional, require, record_field, record_list_field};
use cypherbind::schema::{
    ConversionError, EntityKind, EntityShape, FieldDef, FieldKind, FromRecord, GraphEntity,
    NodeEntity, RelationshipEntity,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub city: Option<String>,
}

static PERSON_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", FieldKind::Primitive),
    FieldDef::with_storage_name("name", "Name", FieldKind::Primitive),
    FieldDef::with_storage_name("age", "Age", FieldKind::Primitive),
    FieldDef::with_storage_name("city", "City", FieldKind::Primitive),
];

static PERSON_SHAPE: EntityShape = EntityShape {
    type_name: "Person",
    label: "Person",
    kind: EntityKind::Node,
    fields: PERSON_FIELDS,
};

impl GraphEntity for Person {
    fn shape() -> &'static EntityShape {
        &PERSON_SHAPE
    }

    fn from_bag(bag: &PropertyBag) -> Result<Self, ConversionError> {
        Ok(Self {
            id: require(bag, "id")?,
            name: require(bag, "Name")?,
            age: require(bag, "Age")?,
            city: optional(bag, "City")?,
        })
    }

    fn to_bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert("id", self.id.clone());
        bag.insert("Name", self.name.clone());
        bag.insert("Age", self.age);
        bag.insert("City", self.city.clone());
        bag
    }

    fn element_id(&self) -> &str {
        &self.id
    }
}

impl NodeEntity for Person {}

#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub industry: String,
}

static COMPANY_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", FieldKind::Primitive),
    FieldDef::with_storage_name("name", "Name", FieldKind::Primitive),
    FieldDef::with_storage_name("industry", "Industry", FieldKind::Primitive),
];

static COMPANY_SHAPE: EntityShape = EntityShape {
    type_name: "Company",
    label: "Company",
    kind: EntityKind::Node,
    fields: COMPANY_FIELDS,
};

impl GraphEntity for Company {
    fn shape() -> &'static EntityShape {
        &COMPANY_SHAPE
    }

    fn from_bag(bag: &PropertyBag) -> Result<Self, ConversionError> {
        Ok(Self {
            id: require(bag, "id")?,
            name: require(bag, "Name")?,
            industry: require(bag, "Industry")?,
        })
    }

    fn to_bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert("id", self.id.clone());
        bag.insert("Name", self.name.clone());
        bag.insert("Industry", self.industry.clone());
        bag
    }

    fn element_id(&self) -> &str {
        &self.id
    }
}

impl NodeEntity for Company {}

#[derive(Debug, Clone, PartialEq)]
pub struct WorksFor {
    pub id: String,
    pub position: String,
    pub salary: i64,
    pub start_id: String,
    pub end_id: String,
}

static WORKS_FOR_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", FieldKind::Primitive),
    FieldDef::with_storage_name("position", "Position", FieldKind::Primitive),
    FieldDef::with_storage_name("salary", "Salary", FieldKind::Primitive),
];

static WORKS_FOR_SHAPE: EntityShape = EntityShape {
    type_name: "WorksFor",
    label: "WORKS_FOR",
    kind: EntityKind::Relationship,
    fields: WORKS_FOR_FIELDS,
};

impl GraphEntity for WorksFor {
    fn shape() -> &'static EntityShape {
        &WORKS_FOR_SHAPE
    }

    fn from_bag(bag: &PropertyBag) -> Result<Self, ConversionError> {
        Ok(Self {
            id: require(bag, "id")?,
            position: require(bag, "Position")?,
            salary: require(bag, "Salary")?,
            // Endpoints live outside the property bag; the materializer
            // fills them in from sibling columns.
            start_id: String::new(),
            end_id: String::new(),
        })
    }

    fn to_bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert("id", self.id.clone());
        bag.insert("Position", self.position.clone());
        bag.insert("Salary", self.salary);
        bag
    }

    fn element_id(&self) -> &str {
        &self.id
    }
}

impl RelationshipEntity for WorksFor {
    fn start_id(&self) -> &str {
        &self.start_id
    }

    fn end_id(&self) -> &str {
        &self.end_id
    }

    fn set_endpoints(&mut self, start_id: String, end_id: String) {
        self.start_id = start_id;
        self.end_id = end_id;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    pub tags: Vec<String>,
}

static EVENT_FIELDS: &[FieldDef] = &[
    FieldDef::new("id", FieldKind::Primitive),
    FieldDef::with_storage_name("title", "Title", FieldKind::Primitive),
    FieldDef::with_storage_name("occurred_at", "OccurredAt", FieldKind::Temporal),
    FieldDef::with_storage_name("tags", "Tags", FieldKind::PrimitiveList),
];

static EVENT_SHAPE: EntityShape = EntityShape {
    type_name: "Event",
    label: "Event",
    kind: EntityKind::Node,
    fields: EVENT_FIELDS,
};

impl GraphEntity for Event {
    fn shape() -> &'static EntityShape {
        &EVENT_SHAPE
    }

    fn from_bag(bag: &PropertyBag) -> Result<Self, ConversionError> {
        Ok(Self {
            id: require(bag, "id")?,
            title: require(bag, "Title")?,
            occurred_at: require(bag, "OccurredAt")?,
            tags: require(bag, "Tags")?,
        })
    }

    fn to_bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new();
        bag.insert("id", self.id.clone());
        bag.insert("Title", self.title.clone());
        bag.insert("OccurredAt", self.occurred_at);
        bag.insert("Tags", self.tags.clone());
        bag
    }

    fn element_id(&self) -> &str {
        &self.id
    }
}

impl NodeEntity for Event {}

/// Record type for native projections over Person
#[derive(Debug, Clone, PartialEq)]
pub struct NameAndAge {
    pub name: String,
    pub age: i64,
}

impl FromRecord for NameAndAge {
    fn from_record(record: &PropertyBag) -> Result<Self, ConversionError> {
        Ok(Self {
            name: record_field(record, "name")?,
            age: record_field(record, "age")?,
        })
    }
}

/// Record type for grouped projections with collected members
#[derive(Debug, Clone, PartialEq)]
pub struct CityGroup {
    pub city: String,
    pub total: i64,
    pub people: Vec<PersonSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonSummary {
    pub name: String,
    pub age: i64,
}

impl FromRecord for PersonSummary {
    fn from_record(record: &PropertyBag) -> Result<Self, ConversionError> {
        Ok(Self {
            name: record_field(record, "Name")?,
            age: record_field(record, "Age")?,
        })
    }
}

impl FromRecord for CityGroup {
    fn from_record(record: &PropertyBag) -> Result<Self, ConversionError> {
        Ok(Self {
            city: record_field(record, "city")?,
            total: record_field(record, "total")?,
            people: record_list_field(record, "people")?,
        })
    }
}

/// A stored Person node value
pub fn person_node(id: &str, name: &str, age: i64, city: Option<&str>) -> NodeValue {
    let person = Person {
        id: id.to_string(),
        name: name.to_string(),
        age,
        city: city.map(str::to_string),
    };
    NodeValue::new(id, vec!["Person".to_string()], person.to_bag())
}

/// A stored Company node value
pub fn company_node(id: &str, name: &str, industry: &str) -> NodeValue {
    let company = Company {
        id: id.to_string(),
        name: name.to_string(),
        industry: industry.to_string(),
    };
    NodeValue::new(id, vec!["Company".to_string()], company.to_bag())
}

/// A stored WORKS_FOR relationship value
pub fn works_for_rel(id: &str, start: &str, end: &str, position: &str, salary: i64) -> RelationshipValue {
    let works_for = WorksFor {
        id: id.to_string(),
        position: position.to_string(),
        salary,
        start_id: start.to_string(),
        end_id: end.to_string(),
    };
    RelationshipValue::new(id, "WORKS_FOR", start, end, works_for.to_bag())
}

/// A single-column row
pub fn single_column(name: &str, value: CypherValue) -> Row {
    Row::from_columns(vec![(name.to_string(), value)])
}

use std::sync::Arc;

use dwarfone_core::db::{DbError, ImportRunRecord, ImportRunStatus, MemoryBlockRecord, ProgramDb};
use dwarfone_core::program::{
    Address, AddressSet, CallingConvention, FunctionUpdate, FunctionUpdateType, Parameter,
    ProgramError, ProgramModel, ProgramSettings, SourceType,
};
use dwarfone_core::types::DataType;
use rusqlite::Connection;
use tempfile::tempdir;

fn int() -> Arc<DataType> {
    Arc::new(DataType::Base { name: "int", size: 4 })
}

fn update(
    params: usize,
    update_type: FunctionUpdateType,
    force: bool,
    source: SourceType,
) -> FunctionUpdate {
    FunctionUpdate {
        return_type: int(),
        params: (0..params).map(|i| Parameter::new(Some(format!("arg{i}")), int())).collect(),
        update_type,
        force,
        source,
    }
}

fn db_with_text(settings: ProgramSettings) -> ProgramDb {
    let db = ProgramDb::open_in_memory(settings).expect("open in-memory db");
    db.add_memory_block(&MemoryBlockRecord::new(".text", 0x1000, 0x2000)).expect("add block");
    db
}

#[test]
fn memory_blocks_form_the_address_set() {
    let db = ProgramDb::open_in_memory(ProgramSettings::default()).expect("open db");
    db.add_memory_block(&MemoryBlockRecord::new(".data", 0x3000, 0x3100)).expect("add data");
    db.add_memory_block(&MemoryBlockRecord::new(".text", 0x1000, 0x2000)).expect("add text");
    db.add_memory_block(&MemoryBlockRecord::new(".text2", 0x2000, 0x2800)).expect("add text2");

    let blocks = db.list_memory_blocks().expect("list blocks");
    let names: Vec<_> = blocks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, [".text", ".text2", ".data"]);

    let set = db.address_set().expect("address set");
    assert_eq!(set.ranges().len(), 2, "adjacent blocks merge");
    assert_eq!(set.num_addresses(), 0x1800 + 0x100);

    let empty = db.add_memory_block(&MemoryBlockRecord::new(".bss", 0x4000, 0x4000));
    assert!(matches!(empty, Err(DbError::InvalidRecord(_))));
}

#[test]
fn dynamic_storage_follows_the_calling_convention() {
    let settings = ProgramSettings {
        calling_convention: CallingConvention {
            name: "mips_eabi".into(),
            parameter_registers: vec!["a0".into(), "a1".into()],
            stack_offset: 0x10,
            stack_slot_size: 4,
        },
        ..ProgramSettings::default()
    };
    let mut db = db_with_text(settings);
    let body = AddressSet::from_range(Address(0x1000), Address(0x1010));
    let id = db.create_function("f", Address(0x1000), &body, SourceType::Imported).expect("create");

    let imported =
        update(3, FunctionUpdateType::DynamicStorageFormalParams, true, SourceType::Imported);
    db.update_function(id, &imported).expect("update");

    let record = db.load_function(id).expect("load").expect("record");
    let storage: Vec<_> = record.params.iter().map(|p| p.storage.clone()).collect();
    assert_eq!(
        storage,
        [Some("a0".to_string()), Some("a1".to_string()), Some("Stack[0x10]".to_string())]
    );
    assert_eq!(record.params[2].name.as_deref(), Some("arg2"));

    let custom = update(1, FunctionUpdateType::CustomStorage, true, SourceType::Imported);
    db.update_function(id, &custom).expect("update custom");
    let record = db.load_function(id).expect("load").expect("record");
    assert_eq!(record.params.len(), 1);
    assert_eq!(record.params[0].storage, None);
}

#[test]
fn user_defined_signatures_need_force() {
    let mut db = db_with_text(ProgramSettings::default());
    let body = AddressSet::from_range(Address(0x1000), Address(0x1010));
    let id =
        db.create_function("f", Address(0x1000), &body, SourceType::UserDefined).expect("create");
    let user = update(0, FunctionUpdateType::CustomStorage, false, SourceType::UserDefined);
    db.update_function(id, &user).expect("user signature");

    let unforced =
        update(2, FunctionUpdateType::DynamicStorageFormalParams, false, SourceType::Imported);
    let locked = db.update_function(id, &unforced);
    assert!(matches!(locked, Err(ProgramError::SignatureLocked(Address(0x1000)))));

    let forced =
        update(2, FunctionUpdateType::DynamicStorageFormalParams, true, SourceType::Imported);
    db.update_function(id, &forced).expect("forced update");
    let record = db.load_function(id).expect("load").expect("record");
    assert_eq!(record.signature_source, Some(SourceType::Imported));
    assert_eq!(record.params.len(), 2);
}

#[test]
fn create_function_enforces_model_rules() {
    let mut db = db_with_text(ProgramSettings::default());
    let body = AddressSet::from_range(Address(0x1000), Address(0x1010));
    db.create_function("f", Address(0x1000), &body, SourceType::Imported).expect("create f");

    let dup = db.create_function(
        "f",
        Address(0x1800),
        &AddressSet::from_range(Address(0x1800), Address(0x1810)),
        SourceType::Imported,
    );
    assert!(matches!(dup, Err(ProgramError::DuplicateName { existing: Address(0x1000), .. })));

    let overlap = db.create_function(
        "g",
        Address(0x1008),
        &AddressSet::from_range(Address(0x1008), Address(0x1020)),
        SourceType::Imported,
    );
    assert!(matches!(
        overlap,
        Err(ProgramError::OverlappingFunction { existing: Address(0x1000), .. })
    ));

    let outside = db.create_function("h", Address(0x1900), &body, SourceType::Imported);
    assert!(matches!(outside, Err(ProgramError::InvalidInput(_))));

    assert_eq!(db.list_functions().expect("list").len(), 1);
}

#[test]
fn rename_checks_name_and_existence() {
    let mut db = db_with_text(ProgramSettings::default());
    let f_body = AddressSet::from_range(Address(0x1000), Address(0x1010));
    let f =
        db.create_function("f", Address(0x1000), &f_body, SourceType::Analysis).expect("create f");
    let g_body = AddressSet::from_range(Address(0x1100), Address(0x1110));
    db.create_function("g", Address(0x1100), &g_body, SourceType::Analysis).expect("create g");

    db.rename_function(f, "f", SourceType::Imported).expect("renaming to own name is fine");
    assert!(matches!(
        db.rename_function(f, "g", SourceType::Imported),
        Err(ProgramError::DuplicateName { .. })
    ));
    assert!(matches!(
        db.rename_function(dwarfone_core::program::FunctionId(99), "x", SourceType::Imported),
        Err(ProgramError::FunctionNotFound(99))
    ));
    assert!(db.function_at(Address(0x1100)).expect("lookup").is_some());
    assert_eq!(db.function_at(Address(0x1200)).expect("lookup"), None);
}

#[test]
fn to_addr_uses_configured_address_size() {
    let settings = ProgramSettings { address_size_bits: 16, ..ProgramSettings::default() };
    let db = ProgramDb::open_in_memory(settings).expect("open db");
    assert_eq!(db.to_addr(0xffff).expect("fits"), Address(0xffff));
    assert!(matches!(db.to_addr(0x1_0000), Err(ProgramError::AddressOutOfBounds { bits: 16, .. })));
}

#[test]
fn import_runs_insert_and_list_round_trip() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("program.db");
    let db = ProgramDb::open(&db_path, ProgramSettings::default()).expect("open db");

    let run = ImportRunRecord {
        source: "entries.json".into(),
        source_hash: Some("abc".into()),
        status: ImportRunStatus::Partial,
        started_at: "t0".into(),
        finished_at: "t1".into(),
        created: 3,
        renamed: 1,
        skipped: 2,
        failed: 1,
    };
    db.insert_import_run(&run).expect("insert run");

    let runs = db.list_import_runs().expect("list runs");
    assert_eq!(runs, vec![run]);
}

#[test]
fn program_db_open_errors_on_unsupported_schema_version() {
    let tmp = tempdir().expect("temp dir");
    let db_path = tmp.path().join("program.db");
    {
        let conn = Connection::open(&db_path).expect("open raw sqlite db");
        conn.pragma_update(None, "user_version", 99_i32).expect("set user_version pragma");
    }

    match ProgramDb::open(&db_path, ProgramSettings::default()) {
        Err(DbError::UnsupportedSchemaVersion { found, min_supported, max_supported }) => {
            assert_eq!(found, 99);
            assert_eq!(min_supported, 0);
            assert_eq!(max_supported, 3);
        }
        Err(err) => panic!("expected UnsupportedSchemaVersion error, got different DbError: {err}"),
        Ok(_) => panic!("expected UnsupportedSchemaVersion error, got Ok(_)"),
    }
}

#[test]
fn reopening_keeps_functions() {
    let tmp = tempdir().expect("temp dir");
    let db_path = tmp.path().join("program.db");
    {
        let mut db = ProgramDb::open(&db_path, ProgramSettings::default()).expect("open db");
        db.add_memory_block(&MemoryBlockRecord::new(".text", 0x1000, 0x2000)).expect("add block");
        let body = AddressSet::from_range(Address(0x1000), Address(0x1010));
        db.create_function("f", Address(0x1000), &body, SourceType::Imported).expect("create");
    }
    let db = ProgramDb::open(&db_path, ProgramSettings::default()).expect("reopen db");
    let version: i32 =
        db.connection().query_row("PRAGMA user_version;", [], |row| row.get(0)).expect("version");
    assert_eq!(version, 3);
    assert_eq!(db.list_functions().expect("list").len(), 1);
}

#[test]
fn addresses_above_the_sign_bit_keep_unsigned_order() {
    let settings = ProgramSettings { address_size_bits: 64, ..ProgramSettings::default() };
    let mut db = ProgramDb::open_in_memory(settings).expect("open db");
    let high = MemoryBlockRecord::new("high", 0x8000_0000_0000_2000, 0x8000_0000_0000_3000);
    let low = MemoryBlockRecord::new("low", 0x7fff_ffff_ffff_f000, 0x8000_0000_0000_1000);
    db.add_memory_block(&high).expect("add high block");
    db.add_memory_block(&low).expect("add straddling block");

    let blocks = db.list_memory_blocks().expect("list blocks");
    assert_eq!(blocks[0], low);
    assert_eq!(blocks[1].name, "high");

    let a = Address(0x7fff_ffff_ffff_ff00);
    let a_body = AddressSet::from_range(a, Address(0x8000_0000_0000_0100));
    db.create_function("a", a, &a_body, SourceType::Imported).expect("create a");

    let inside = Address(0x8000_0000_0000_0010);
    let nested = db.create_function(
        "b",
        inside,
        &AddressSet::from_range(inside, Address(0x8000_0000_0000_0020)),
        SourceType::Imported,
    );
    assert!(matches!(
        nested,
        Err(ProgramError::OverlappingFunction { existing, .. }) if existing == a
    ));

    let c = Address(0x8000_0000_0000_2000);
    let c_body = AddressSet::from_range(c, Address(0x8000_0000_0000_2010));
    db.create_function("c", c, &c_body, SourceType::Imported).expect("create c");
    let entries: Vec<_> = db.list_functions().expect("list").into_iter().map(|f| f.entry).collect();
    assert_eq!(entries, vec![a, c]);
    assert!(db.function_at(c).expect("lookup").is_some());
}

#[test]
fn version_two_databases_are_migrated_in_place() {
    let tmp = tempdir().expect("temp dir");
    let db_path = tmp.path().join("program.db");
    {
        let conn = Connection::open(&db_path).expect("open raw sqlite db");
        conn.execute_batch(
            r#"
            CREATE TABLE memory_blocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE,
                start_addr INTEGER NOT NULL, end_addr INTEGER NOT NULL
            );
            CREATE TABLE functions (
                id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE,
                entry INTEGER NOT NULL UNIQUE, name_source TEXT NOT NULL,
                return_type TEXT, signature_source TEXT
            );
            CREATE TABLE function_ranges (
                function_id INTEGER NOT NULL, start_addr INTEGER NOT NULL, end_addr INTEGER NOT NULL
            );
            CREATE TABLE function_params (
                function_id INTEGER NOT NULL, ordinal INTEGER NOT NULL, name TEXT,
                data_type TEXT NOT NULL, storage TEXT, PRIMARY KEY(function_id, ordinal)
            );
            CREATE TABLE import_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT, source TEXT NOT NULL, source_hash TEXT,
                status TEXT NOT NULL, started_at TEXT NOT NULL, finished_at TEXT NOT NULL,
                created INTEGER NOT NULL, renamed INTEGER NOT NULL, skipped INTEGER NOT NULL,
                failed INTEGER NOT NULL
            );
            INSERT INTO memory_blocks (name, start_addr, end_addr) VALUES ('.text', 4096, 8192);
            INSERT INTO functions (name, entry, name_source) VALUES ('f', 4096, 'imported');
            INSERT INTO function_ranges (function_id, start_addr, end_addr) VALUES (1, 4096, 4112);
            PRAGMA user_version = 2;
            "#,
        )
        .expect("create version 2 schema");
    }

    let db = ProgramDb::open(&db_path, ProgramSettings::default()).expect("open and migrate");
    assert_eq!(
        db.list_memory_blocks().expect("blocks"),
        vec![MemoryBlockRecord::new(".text", 0x1000, 0x2000)]
    );
    let functions = db.list_functions().expect("functions");
    assert_eq!(functions[0].entry, Address(0x1000));
    assert_eq!(
        functions[0].body,
        vec![dwarfone_core::program::AddressRange::new(Address(0x1000), Address(0x1010))]
    );
    assert_eq!(db.function_at(Address(0x1000)).expect("lookup"), Some(functions[0].id));
}

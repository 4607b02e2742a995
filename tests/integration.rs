use std::{cell::RefCell, rc::Rc, str::from_utf8, thread};

use ledger_shorthand::{
    AliasConfig, AliasTable, ArgumentError,
    bin_utils::{RowError, Service},
};

const ALIASES: &str = include_str!("aliases.json");
const ARGUMENTS: &str = include_str!("arguments.csv");

#[test]
fn resolve_arguments() {
    let table = AliasTable::new(AliasConfig::from_json(ALIASES).unwrap()).unwrap();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let mut output = Vec::new();
    let service = Service {
        table,
        input: ARGUMENTS.as_bytes(),
        output: &mut output,
        error_printer: Box::new({
            let errors = errors.clone();
            move |line, err| errors.borrow_mut().push((line, err))
        }),
    };
    service.run().unwrap();

    let lines: Vec<&str> = from_utf8(&output).unwrap().lines().collect();
    assert_eq!(
        lines,
        [
            "input,kind,wallet,currency,issuer,amount,shorthand",
            "bank,wallet,rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe,,,,bank",
            "USD:25@bank,value,rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe,USD,rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe,25,USD:25@bank",
            "BTC@root,asset,rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh,BTC,rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe,,BTC@root",
            "XRP:1.5@rN7n7otQDd6FczFgLdSqtcsAUxDkw6fzRH,value,rN7n7otQDd6FczFgLdSqtcsAUxDkw6fzRH,XRP,,1.5,XRP:1.5@fund",
            "USD.root:3@fund,value,rN7n7otQDd6FczFgLdSqtcsAUxDkw6fzRH,USD,rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh,3,USD.root:3@fund",
        ]
    );

    let errors = errors.borrow();
    assert_eq!(errors.len(), 4);
    assert!(errors.iter().all(|(_, err)| matches!(err, RowError::Argument(_))));
    assert!(matches!(
        errors[0].1,
        RowError::Argument(ArgumentError::NonFiniteAmount { .. })
    ));
    assert!(matches!(
        errors[2].1,
        RowError::Argument(ArgumentError::KindMismatch { .. })
    ));
    assert!(matches!(
        errors[3].1,
        RowError::Argument(ArgumentError::MalformedInput { .. })
    ));
}

#[test]
fn shorthand_survives_round_trip() {
    let table = AliasTable::new(AliasConfig::from_json(ALIASES).unwrap()).unwrap();
    for input in ["USD:25@bank", "BTC.root@fund", "XRP:0.25@root", "fund"] {
        let arg = table.parse(input).unwrap();
        assert_eq!(table.parse(&arg.to_shorthand()).unwrap(), arg);
    }
}

#[test]
fn tables_are_independent() {
    let first = AliasTable::new(AliasConfig::from_json(ALIASES).unwrap()).unwrap();
    let second = AliasTable::new(AliasConfig::testnet(
        "rsQP8f2ZCq3oH3XVJ5XRD8Wz5fx3KgoD5m",
        ledger_shorthand::config::WalletEntry {
            address: "rN7n7otQDd6FczFgLdSqtcsAUxDkw6fzRH".to_string(),
            secret: None,
        },
    ))
    .unwrap();

    let a = first.parse("USD:1@bank").unwrap();
    let b = second.parse("USD:1@bank").unwrap();
    assert_ne!(a.wallet(), b.wallet());
    assert_eq!(b.to_string(), "USD:1@bank");
    assert_eq!(second.parse("XMM@root").unwrap().to_string(), "XMM@root");
}

#[test]
fn table_is_shared_across_threads() {
    let table = AliasTable::new(AliasConfig::from_json(ALIASES).unwrap()).unwrap();
    let parsed = thread::scope(|scope| {
        let workers: Vec<_> = ["USD:1@bank", "BTC@fund", "root"]
            .into_iter()
            .map(|input| {
                let table = &table;
                scope.spawn(move || table.parse(input).unwrap())
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect::<Vec<_>>()
    });
    let shorthands: Vec<_> = parsed.iter().map(ToString::to_string).collect();
    assert_eq!(shorthands, ["USD:1@bank", "BTC@fund", "root"]);
}

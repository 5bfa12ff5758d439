// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use parley::model::{
    FilterCondition, FilterOperator, Meeting, MeetingId, MeetingStatus, SortSpec, TableKind,
    Workspace, WorkspaceId,
};
use parley::query::table::{query_workspace_table, TableQuery};

// Benchmark identity (keep stable):
// - Group name in this file: `table.query`
// - Case IDs (`sorted_1k`, `filtered_search_10k`, ...) must stay stable so results stay comparable.
const COMPANIES: [&str; 6] = ["Northwind", "Contoso", "Fabrikam", "Litware", "Tailspin", "Adatum"];

fn workspace_with_meetings(count: usize) -> Workspace {
    let mut workspace = Workspace::new(WorkspaceId::new("w:bench").expect("workspace id"));
    let base = NaiveDate::from_ymd_opt(2025, 1, 1).expect("base date");
    for idx in 0..count {
        let meeting_id = MeetingId::new(format!("m:{idx:06}")).expect("meeting id");
        let date = base.checked_add_days(Days::new((idx * 7 % 720) as u64)).expect("date in range");
        let mut meeting =
            Meeting::new(meeting_id.clone(), format!("Interview {idx:06}"), format!("Respondent {}", idx % 97), date);
        meeting.company = COMPANIES[idx % COMPANIES.len()].to_owned();
        meeting.status = MeetingStatus::ALL[idx % MeetingStatus::ALL.len()];
        workspace.meetings_mut().insert(meeting_id, meeting);
    }
    workspace
}

fn checksum(records: impl Iterator<Item = String>) -> u64 {
    records.fold(0u64, |acc, record| acc.wrapping_mul(131).wrapping_add(record.len() as u64))
}

fn benches_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("table.query");

    for (case, count) in [("1k", 1_000usize), ("10k", 10_000)] {
        let workspace = workspace_with_meetings(count);
        group.throughput(Throughput::Elements(count as u64));

        let sorted = TableQuery {
            sort: vec![SortSpec::desc("date"), SortSpec::asc("company")],
            page_size: 50,
            ..TableQuery::default()
        };
        group.bench_function(format!("sorted_{case}"), |b| {
            b.iter(|| {
                let page = query_workspace_table(&workspace, TableKind::Meetings, black_box(&sorted))
                    .expect("query");
                black_box(checksum(page.rows.into_iter().map(|row| row.record)))
            })
        });

        let filtered = TableQuery {
            conditions: vec![FilterCondition::new(
                "status",
                FilterOperator::Equals,
                vec!["scheduled".to_owned()],
            )],
            search: Some("contoso".to_owned()),
            sort: vec![SortSpec::asc("title")],
            page: 3,
            page_size: 25,
        };
        group.bench_function(format!("filtered_search_{case}"), |b| {
            b.iter(|| {
                let page = query_workspace_table(&workspace, TableKind::Meetings, black_box(&filtered))
                    .expect("query");
                black_box(checksum(page.rows.into_iter().map(|row| row.record)))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benches_table);
criterion_main!(benches);

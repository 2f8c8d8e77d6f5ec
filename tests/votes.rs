mod common;

use uniforum::{
    error::ForumError,
    models::{VoteDirection::*, VoteOutcome, VoteState},
};

use common::Forum;

async fn one_post() -> (Forum, i64, i64) {
    let forum = common::forum().await;
    let author = forum.user("author").await;
    let voter = forum.user("voter").await;
    let community = forum.community("CS 5010").await;
    let post = forum.post(community, author, "Exam tips", "Sleep well.", None).await;
    (forum, post, voter)
}

#[tokio::test]
async fn up_up_down_from_five() {
    let (forum, post, voter) = one_post().await;
    forum.set_likes(post, 5).await;

    let outcome = forum.votes.apply_vote(post, voter, Up).await.unwrap();
    assert_eq!(outcome, VoteOutcome { applied: true, new_count: 6 });
    assert_eq!(forum.votes.vote_state(post, voter).await.unwrap(), VoteState::Up);

    let outcome = forum.votes.apply_vote(post, voter, Up).await.unwrap();
    assert_eq!(outcome, VoteOutcome { applied: false, new_count: 5 });
    assert_eq!(forum.votes.vote_state(post, voter).await.unwrap(), VoteState::None);

    let outcome = forum.votes.apply_vote(post, voter, Down).await.unwrap();
    assert_eq!(outcome, VoteOutcome { applied: true, new_count: 4 });
    assert_eq!(forum.votes.vote_state(post, voter).await.unwrap(), VoteState::Down);
}

#[tokio::test]
async fn upvote_twice_restores_count() {
    let (forum, post, voter) = one_post().await;
    forum.set_likes(post, 3).await;

    forum.votes.apply_vote(post, voter, Up).await.unwrap();
    let outcome = forum.votes.apply_vote(post, voter, Up).await.unwrap();

    assert_eq!(outcome.new_count, 3);
    assert!(!outcome.applied);
    assert_eq!(forum.votes.vote_state(post, voter).await.unwrap(), VoteState::None);
    assert_eq!(forum.vote_rows(post).await, 0);
}

#[tokio::test]
async fn flip_to_down_subtracts_two_without_clamping() {
    let (forum, post, voter) = one_post().await;

    let up = forum.votes.apply_vote(post, voter, Up).await.unwrap();
    assert_eq!(up.new_count, 1);

    let down = forum.votes.apply_vote(post, voter, Down).await.unwrap();
    assert_eq!(down, VoteOutcome { applied: true, new_count: -1 });
    assert_eq!(forum.votes.vote_state(post, voter).await.unwrap(), VoteState::Down);
    assert_eq!(forum.vote_rows(post).await, 1);
}

#[tokio::test]
async fn flip_to_up_adds_two() {
    let (forum, post, voter) = one_post().await;
    forum.set_likes(post, 3).await;

    assert_eq!(forum.votes.apply_vote(post, voter, Down).await.unwrap().new_count, 2);
    assert_eq!(forum.votes.apply_vote(post, voter, Up).await.unwrap().new_count, 4);
    assert_eq!(forum.votes.vote_state(post, voter).await.unwrap(), VoteState::Up);
}

#[tokio::test]
async fn downvoting_at_zero_never_shows_negative() {
    let (forum, post, voter) = one_post().await;

    let first = forum.votes.apply_vote(post, voter, Down).await.unwrap();
    assert!(first.applied);
    assert!(first.new_count >= 0);
    assert_eq!(first.new_count, 0);

    let second = forum.votes.apply_vote(post, voter, Down).await.unwrap();
    assert!(!second.applied);
    assert!(second.new_count >= 0);
    assert_eq!(forum.votes.vote_state(post, voter).await.unwrap(), VoteState::None);
}

#[tokio::test]
async fn count_tracks_vote_sum_from_zero() {
    let (forum, post, _) = one_post().await;
    let mut voters = Vec::new();
    for i in 0..4 {
        voters.push(forum.user(&format!("v{i}")).await);
    }

    forum.votes.apply_vote(post, voters[0], Up).await.unwrap();
    forum.votes.apply_vote(post, voters[1], Up).await.unwrap();
    forum.votes.apply_vote(post, voters[2], Up).await.unwrap();
    forum.votes.apply_vote(post, voters[3], Down).await.unwrap();
    forum.votes.apply_vote(post, voters[0], Up).await.unwrap();
    forum.votes.apply_vote(post, voters[1], Down).await.unwrap();

    assert_eq!(forum.likes(post).await, forum.vote_sum(post).await);
    assert_eq!(forum.likes(post).await, -1);
    assert_eq!(forum.vote_rows(post).await, 3);
}

#[tokio::test]
async fn concurrent_votes_are_all_counted() {
    let (forum, post, _) = one_post().await;
    let mut voters = Vec::new();
    for i in 0..16 {
        voters.push(forum.user(&format!("v{i}")).await);
    }

    let handles: Vec<_> = voters
        .iter()
        .map(|&voter| {
            let engine = forum.votes.clone();
            tokio::spawn(async move { engine.apply_vote(post, voter, Up).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().applied);
    }

    assert_eq!(forum.likes(post).await, 16);
    assert_eq!(forum.vote_sum(post).await, 16);
}

#[tokio::test]
async fn same_user_racing_toggles_stays_consistent() {
    let (forum, post, voter) = one_post().await;

    let handles: Vec<_> = (0..9)
        .map(|_| {
            let engine = forum.votes.clone();
            tokio::spawn(async move { engine.apply_vote(post, voter, Up).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // odd number of toggles ends upvoted
    assert_eq!(forum.votes.vote_state(post, voter).await.unwrap(), VoteState::Up);
    assert_eq!(forum.likes(post).await, 1);
    assert_eq!(forum.vote_rows(post).await, 1);
}

#[tokio::test]
async fn unknown_post_or_user_changes_nothing() {
    let (forum, post, voter) = one_post().await;

    let missing_post = forum.votes.apply_vote(post + 100, voter, Up).await.unwrap();
    assert_eq!(missing_post, VoteOutcome { applied: false, new_count: 0 });

    let missing_user = forum.votes.apply_vote(post, 999, Up).await.unwrap();
    assert_eq!(missing_user, VoteOutcome { applied: false, new_count: 0 });

    assert_eq!(forum.likes(post).await, 0);
    assert_eq!(forum.vote_rows(post).await, 0);
    assert_eq!(forum.votes.vote_state(post + 100, voter).await.unwrap(), VoteState::None);
}

#[tokio::test]
async fn failed_count_update_rolls_back_vote_row() {
    let (forum, post, voter) = one_post().await;
    sqlx::query(
        "CREATE TRIGGER refuse_likes BEFORE UPDATE OF number_of_likes ON Posts BEGIN SELECT RAISE(ABORT, 'refused'); END",
    )
    .execute(&forum.pool)
    .await
    .unwrap();

    let err = forum.votes.apply_vote(post, voter, Up).await.unwrap_err();
    assert!(matches!(err, ForumError::Storage(_)));

    assert_eq!(forum.votes.vote_state(post, voter).await.unwrap(), VoteState::None);
    assert_eq!(forum.vote_rows(post).await, 0);
    assert_eq!(forum.likes(post).await, 0);
}
